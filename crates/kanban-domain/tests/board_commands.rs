use chrono::{DateTime, Duration, Utc};
use kanban_domain::commands::*;
use kanban_domain::*;

fn t0() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-03-01T09:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn insert_column(board: &mut Board, id: &str, title: &str) {
    let column = Column::new(id, board.id.clone(), title, "#D6E8FF", 0, t0());
    board.apply(&InsertColumn { column }, t0()).unwrap();
}

fn insert_task(board: &mut Board, id: &str, column_id: &str) {
    let task = Task::new(id, column_id, format!("Task {id}"), 0, t0());
    board.apply(&InsertTask { task }, t0()).unwrap();
}

/// Todo: [T1, T2], Doing: [T4], Done: []
fn scenario_board() -> Board {
    let mut board = Board::new("b1", "Scenario", t0());
    insert_column(&mut board, "todo", "Todo");
    insert_column(&mut board, "doing", "Doing");
    insert_column(&mut board, "done", "Done");
    insert_task(&mut board, "T1", "todo");
    insert_task(&mut board, "T2", "todo");
    insert_task(&mut board, "T4", "doing");
    board.check_invariants().unwrap();
    board
}

fn task_ids(board: &Board, column_id: &str) -> Vec<String> {
    board.column(column_id).unwrap().task_ids.clone()
}

fn column_order(board: &Board) -> Vec<(String, u32)> {
    board
        .columns
        .iter()
        .map(|c| (c.id.clone(), c.position))
        .collect()
}

#[test]
fn test_move_task_across_columns() {
    let mut board = scenario_board();

    board
        .apply(
            &MoveTask {
                task_id: "T1".to_string(),
                source_column_id: "todo".to_string(),
                dest_column_id: "done".to_string(),
                index: 0,
            },
            t0(),
        )
        .unwrap();

    assert_eq!(task_ids(&board, "todo"), vec!["T2"]);
    assert_eq!(task_ids(&board, "done"), vec!["T1"]);
    assert_eq!(board.task("T1").unwrap().column_id, "done");
    assert_eq!(board.task("T2").unwrap().position, 0);
    board.check_invariants().unwrap();
}

#[test]
fn test_reorder_columns_to_given_permutation() {
    let mut board = scenario_board();

    board
        .apply(
            &ReorderColumns {
                ordered_ids: vec!["done".to_string(), "todo".to_string(), "doing".to_string()],
            },
            t0(),
        )
        .unwrap();

    assert_eq!(
        column_order(&board),
        vec![
            ("done".to_string(), 0),
            ("todo".to_string(), 1),
            ("doing".to_string(), 2)
        ]
    );
    board.check_invariants().unwrap();
}

#[test]
fn test_same_column_move_to_front() {
    let mut board = scenario_board();
    insert_task(&mut board, "T3", "todo");

    board
        .apply(
            &MoveTask {
                task_id: "T3".to_string(),
                source_column_id: "todo".to_string(),
                dest_column_id: "todo".to_string(),
                index: 0,
            },
            t0(),
        )
        .unwrap();

    assert_eq!(task_ids(&board, "todo"), vec!["T3", "T1", "T2"]);
    board.check_invariants().unwrap();
}

#[test]
fn test_delete_column_cascades_and_renumbers() {
    let mut board = scenario_board();
    let todo_before = task_ids(&board, "todo");

    board
        .apply(
            &RemoveColumn {
                column_id: "doing".to_string(),
            },
            t0(),
        )
        .unwrap();

    assert!(board.column("doing").is_none());
    assert!(board.task("T4").is_none());
    assert_eq!(task_ids(&board, "todo"), todo_before);
    assert_eq!(
        column_order(&board),
        vec![("todo".to_string(), 0), ("done".to_string(), 1)]
    );
    board.check_invariants().unwrap();
}

#[test]
fn test_move_to_current_index_is_identity() {
    let mut board = scenario_board();
    insert_task(&mut board, "T3", "todo");
    let before = task_ids(&board, "todo");

    for (index, id) in before.clone().iter().enumerate() {
        board
            .apply(
                &MoveTask {
                    task_id: id.clone(),
                    source_column_id: "todo".to_string(),
                    dest_column_id: "todo".to_string(),
                    index,
                },
                t0(),
            )
            .unwrap();
        assert_eq!(task_ids(&board, "todo"), before);
    }
}

#[test]
fn test_move_index_is_clamped() {
    let mut board = scenario_board();

    board
        .apply(
            &MoveTask {
                task_id: "T1".to_string(),
                source_column_id: "todo".to_string(),
                dest_column_id: "doing".to_string(),
                index: 99,
            },
            t0(),
        )
        .unwrap();

    assert_eq!(task_ids(&board, "doing"), vec!["T4", "T1"]);
    assert_eq!(board.task("T1").unwrap().position, 1);
    board.check_invariants().unwrap();
}

#[test]
fn test_move_from_wrong_source_is_rejected_without_changes() {
    let mut board = scenario_board();
    let before = board.clone();

    let err = board
        .apply(
            &MoveTask {
                task_id: "T1".to_string(),
                source_column_id: "doing".to_string(),
                dest_column_id: "done".to_string(),
                index: 0,
            },
            t0(),
        )
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(board, before);
}

#[test]
fn test_reorder_skips_unknown_and_keeps_unlisted() {
    let mut board = scenario_board();

    board
        .apply(
            &ReorderColumns {
                ordered_ids: vec!["ghost".to_string(), "done".to_string()],
            },
            t0(),
        )
        .unwrap();

    let ids: Vec<String> = board.columns.iter().map(|c| c.id.clone()).collect();
    assert_eq!(ids, vec!["done", "todo", "doing"]);
    board.check_invariants().unwrap();
}

#[test]
fn test_remove_task_renumbers_column() {
    let mut board = scenario_board();
    insert_task(&mut board, "T3", "todo");

    board
        .apply(
            &RemoveTask {
                task_id: "T1".to_string(),
            },
            t0(),
        )
        .unwrap();

    assert_eq!(task_ids(&board, "todo"), vec!["T2", "T3"]);
    assert_eq!(board.task("T3").unwrap().position, 1);
    board.check_invariants().unwrap();
}

#[test]
fn test_touched_entities_share_the_mutation_timestamp() {
    let mut board = scenario_board();
    let later = t0() + Duration::minutes(5);

    board
        .apply(
            &MoveTask {
                task_id: "T1".to_string(),
                source_column_id: "todo".to_string(),
                dest_column_id: "doing".to_string(),
                index: 0,
            },
            later,
        )
        .unwrap();

    assert_eq!(board.updated_at, later);
    assert_eq!(board.task("T1").unwrap().updated_at, later);
    assert_eq!(board.column("todo").unwrap().updated_at, later);
    assert_eq!(board.column("doing").unwrap().updated_at, later);
    assert_eq!(board.column("done").unwrap().updated_at, t0());
}

#[test]
fn test_mixed_sequence_keeps_invariants() {
    let mut board = scenario_board();
    let columns = ["todo", "doing", "done"];
    let mut seed: u64 = 7;
    let mut next = move |bound: usize| {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((seed >> 33) as usize) % bound.max(1)
    };

    for step in 0..200 {
        let ids: Vec<String> = board.tasks.keys().cloned().collect();
        match next(4) {
            0 => {
                let column = columns[next(columns.len())];
                if board.column(column).is_some() {
                    insert_task(&mut board, &format!("N{step}"), column);
                }
            }
            1 if !ids.is_empty() => {
                let id = &ids[next(ids.len())];
                let source = board.task(id).unwrap().column_id.clone();
                let dest = board.columns[next(board.columns.len())].id.clone();
                board
                    .apply(
                        &MoveTask {
                            task_id: id.clone(),
                            source_column_id: source,
                            dest_column_id: dest,
                            index: next(6),
                        },
                        t0(),
                    )
                    .unwrap();
            }
            2 if !ids.is_empty() => {
                let id = ids[next(ids.len())].clone();
                board.apply(&RemoveTask { task_id: id }, t0()).unwrap();
            }
            _ => {
                let mut order = board.column_ids();
                let shift = next(order.len());
                order.rotate_left(shift);
                board
                    .apply(&ReorderColumns { ordered_ids: order }, t0())
                    .unwrap();
            }
        }
        board.check_invariants().unwrap();
    }
}
