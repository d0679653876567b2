use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use rusqlite::Connection;
use tidytask_core::db::open_db_in_memory;
use tidytask_core::{
    check_order, OrderKey, SortKeyConfig, SortKeyError, SqliteTaskRepository, Task,
    TaskOrderError, TaskOrderService, TaskRepository,
};
use uuid::Uuid;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn service(conn: &Connection) -> TaskOrderService<SqliteTaskRepository<'_>, StdRng> {
    let repo = SqliteTaskRepository::try_new(conn).unwrap();
    TaskOrderService::with_rng(repo, SortKeyConfig::default(), StdRng::seed_from_u64(17))
}

fn titles(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|task| task.title.as_str()).collect()
}

fn stored_key(conn: &Connection, task: &Task) -> String {
    conn.query_row(
        "SELECT task_sort FROM tasks WHERE uuid = ?1",
        [task.uuid.to_string()],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn first_insert_uses_default_key_and_appends_grow() {
    let conn = setup();
    let mut service = service(&conn);
    let list = Some(Uuid::new_v4());

    let first = service.insert_task(list, "first", None).unwrap();
    assert_eq!(first.task_sort, SortKeyConfig::default().default_key());

    let second = service.insert_task(list, "second", None).unwrap();
    let third = service.insert_task(list, "third", Some(99)).unwrap();
    assert!(first.task_sort < second.task_sort);
    assert!(second.task_sort < third.task_sort);

    let listed = service.list_tasks(list).unwrap();
    assert_eq!(titles(&listed), vec!["first", "second", "third"]);
}

#[test]
fn insert_at_head_and_between() {
    let conn = setup();
    let mut service = service(&conn);
    let list = None;

    service.insert_task(list, "b", None).unwrap();
    service.insert_task(list, "d", None).unwrap();
    service.insert_task(list, "a", Some(0)).unwrap();
    service.insert_task(list, "c", Some(2)).unwrap();

    let listed = service.list_tasks(list).unwrap();
    assert_eq!(titles(&listed), vec!["a", "b", "c", "d"]);
    check_order(&listed, Task::is_active).unwrap();
}

#[test]
fn blank_title_is_rejected() {
    let conn = setup();
    let mut service = service(&conn);
    let err = service.insert_task(None, "   ", None).unwrap_err();
    assert!(matches!(err, TaskOrderError::InvalidTitle));
}

#[test]
fn move_within_list_bisects_and_touches_only_moved_row() {
    let conn = setup();
    let mut service = service(&conn);
    let list = Some(Uuid::new_v4());
    for title in ["a", "b", "c", "d"] {
        service.insert_task(list, title, None).unwrap();
    }
    let before = service.list_tasks(list).unwrap();
    let untouched: Vec<_> = before[..3].iter().map(|task| stored_key(&conn, task)).collect();

    let moved = service.move_within_list(list, 3, 1).unwrap();
    assert_eq!(moved.title, "d");
    assert!(before[0].task_sort < moved.task_sort && moved.task_sort < before[1].task_sort);

    let after = service.list_tasks(list).unwrap();
    assert_eq!(titles(&after), vec!["a", "d", "b", "c"]);
    for (task, snapshot) in before[..3].iter().zip(untouched) {
        assert_eq!(stored_key(&conn, task), snapshot);
    }
    check_order(&after, Task::is_active).unwrap();
}

#[test]
fn move_to_head_and_tail() {
    let conn = setup();
    let mut service = service(&conn);
    let list = None;
    for title in ["a", "b", "c"] {
        service.insert_task(list, title, None).unwrap();
    }

    service.move_within_list(list, 2, 0).unwrap();
    assert_eq!(titles(&service.list_tasks(list).unwrap()), vec!["c", "a", "b"]);

    service.move_within_list(list, 0, 2).unwrap();
    assert_eq!(titles(&service.list_tasks(list).unwrap()), vec!["a", "b", "c"]);
}

#[test]
fn same_index_move_is_a_no_op() {
    let conn = setup();
    let mut service = service(&conn);
    let task = service.insert_task(None, "solo", None).unwrap();
    let moved = service.move_within_list(None, 0, 0).unwrap();
    assert_eq!(moved, task);
}

#[test]
fn out_of_range_move_fails_loudly() {
    let conn = setup();
    let mut service = service(&conn);
    service.insert_task(None, "a", None).unwrap();

    let err = service.move_within_list(None, 0, 4).unwrap_err();
    assert!(matches!(
        err,
        TaskOrderError::Sort(SortKeyError::InvalidIndex { index: 4, len: 1 })
    ));
    let err = service.move_within_list(None, 7, 0).unwrap_err();
    assert!(matches!(
        err,
        TaskOrderError::Sort(SortKeyError::InvalidIndex { index: 7, len: 1 })
    ));
}

#[test]
fn calendar_rows_are_skipped_as_neighbors_and_never_move() {
    let conn = setup();
    let mut service = service(&conn);
    let list = Some(Uuid::new_v4());

    let a = service.insert_task(list, "a", None).unwrap();
    let b = service.insert_task(list, "b", None).unwrap();
    service.insert_task(list, "c", None).unwrap();
    let mid = OrderKey::new((a.task_sort.value() + b.task_sort.value()) / Decimal::TWO);
    let meeting = service.mirror_calendar_task(list, "standup", mid).unwrap();
    assert_eq!(
        titles(&service.list_tasks(list).unwrap()),
        vec!["a", "standup", "b", "c"]
    );

    // Dropping `c` above the calendar row bisects a..b, not a..standup.
    let moved = service.move_within_list(list, 3, 1).unwrap();
    assert_eq!(moved.title, "c");
    assert_eq!(moved.task_sort, mid);
    let stored = service.list_tasks(list).unwrap();
    let meeting_index = stored
        .iter()
        .position(|task| task.uuid == meeting.uuid)
        .unwrap();
    assert_eq!(stored[meeting_index].task_sort, mid);

    let err = service.move_within_list(list, meeting_index, 0).unwrap_err();
    assert!(matches!(err, TaskOrderError::SystemDerivedTask(id) if id == meeting.uuid));
    let err = service.move_to_list(meeting.uuid, None, None).unwrap_err();
    assert!(matches!(err, TaskOrderError::SystemDerivedTask(_)));
}

#[test]
fn move_to_other_list_allocates_against_target() {
    let conn = setup();
    let mut service = service(&conn);
    let inbox = None;
    let project = Some(Uuid::new_v4());

    let task = service.insert_task(inbox, "errand", None).unwrap();
    service.insert_task(project, "x", None).unwrap();
    service.insert_task(project, "y", None).unwrap();

    let moved = service.move_to_list(task.uuid, project, Some(1)).unwrap();
    assert_eq!(moved.list_uuid, project);
    assert!(service.list_tasks(inbox).unwrap().is_empty());
    assert_eq!(
        titles(&service.list_tasks(project).unwrap()),
        vec!["x", "errand", "y"]
    );
}

#[test]
fn move_into_empty_list_keeps_existing_key() {
    let conn = setup();
    let mut service = service(&conn);
    service.insert_task(None, "a", None).unwrap();
    let task = service.insert_task(None, "b", None).unwrap();

    let target = Some(Uuid::new_v4());
    let moved = service.move_to_list(task.uuid, target, None).unwrap();
    assert_eq!(moved.task_sort, task.task_sort);
    assert_eq!(moved.list_uuid, target);
}

#[test]
fn move_unknown_task_reports_not_found() {
    let conn = setup();
    let mut service = service(&conn);
    let missing = Uuid::new_v4();
    let err = service.move_to_list(missing, None, None).unwrap_err();
    assert!(matches!(err, TaskOrderError::TaskNotFound(id) if id == missing));
}

#[test]
fn many_drags_keep_list_strictly_ordered() {
    let conn = setup();
    let mut service = service(&conn);
    let list = Some(Uuid::new_v4());
    for index in 0..8 {
        service
            .insert_task(list, format!("task-{index}"), None)
            .unwrap();
    }

    let moves = [(7, 0), (0, 7), (3, 4), (5, 1), (6, 2), (1, 6), (4, 4), (2, 0)];
    for _ in 0..3 {
        for (from, to) in moves {
            let before = service.list_tasks(list).unwrap();
            let moved = service.move_within_list(list, from, to).unwrap();
            let after = service.list_tasks(list).unwrap();
            assert_eq!(after[to].uuid, moved.uuid);
            assert_eq!(after.len(), before.len());
            check_order(&after, Task::is_active).unwrap();
        }
    }
}

#[test]
fn repository_rejects_corrupted_key_text() {
    let conn = setup();
    let mut service = service(&conn);
    let task = service.insert_task(None, "a", None).unwrap();
    conn.execute(
        "UPDATE tasks SET task_sort = 'NaN' WHERE uuid = ?1",
        [task.uuid.to_string()],
    )
    .unwrap();

    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let err = repo.get_task(task.uuid, false).unwrap_err();
    assert!(err.to_string().contains("tasks.task_sort"));
}

#[test]
fn list_orders_by_decimal_value_not_text() {
    let conn = setup();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    for (title, key) in [("ten", "10"), ("nine", "9"), ("nine-and-half", "9.5")] {
        repo.create_task(&Task::new(None, title, key.parse().unwrap()))
            .unwrap();
    }
    let listed = repo.list_tasks(None).unwrap();
    assert_eq!(titles(&listed), vec!["nine", "nine-and-half", "ten"]);
}
