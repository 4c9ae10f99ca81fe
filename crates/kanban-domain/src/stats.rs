use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::board::Board;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoardStats {
    pub columns: usize,
    pub total_tasks: usize,
    /// Tasks sitting in a column classified as done.
    pub completed_tasks: usize,
    /// Tasks past their due date that are not completed.
    pub overdue_tasks: usize,
}

impl BoardStats {
    pub fn compute(board: &Board, now: DateTime<Utc>) -> Self {
        let mut completed_tasks = 0;
        let mut overdue_tasks = 0;

        for column in &board.columns {
            let done = column.role().is_done();
            for task in board.tasks_in(&column.id) {
                if done {
                    completed_tasks += 1;
                } else if task.is_overdue(now) {
                    overdue_tasks += 1;
                }
            }
        }

        Self {
            columns: board.columns.len(),
            total_tasks: board.tasks.len(),
            completed_tasks,
            overdue_tasks,
        }
    }

    pub fn completion_ratio(&self) -> f64 {
        if self.total_tasks == 0 {
            0.0
        } else {
            self.completed_tasks as f64 / self.total_tasks as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Column;
    use crate::task::Task;

    #[test]
    fn test_counts_done_and_overdue() {
        let now = Utc::now();
        let mut board = Board::new("b1", "Board", now);
        board
            .columns
            .push(Column::new("todo", "b1", "To Do", "#D6E8FF", 0, now));
        board
            .columns
            .push(Column::new("done", "b1", "Done", "#C1FBA4", 1, now));

        let mut late = Task::new("t1", "todo", "Late", 0, now);
        late.due_date = Some(now - chrono::Duration::days(2));
        let mut finished_late = Task::new("t2", "done", "Finished", 0, now);
        finished_late.due_date = Some(now - chrono::Duration::days(2));

        board.columns[0].task_ids.push("t1".to_string());
        board.columns[1].task_ids.push("t2".to_string());
        board.tasks.insert("t1".to_string(), late);
        board.tasks.insert("t2".to_string(), finished_late);

        let stats = BoardStats::compute(&board, now);
        assert_eq!(stats.columns, 2);
        assert_eq!(stats.total_tasks, 2);
        assert_eq!(stats.completed_tasks, 1);
        assert_eq!(stats.overdue_tasks, 1);
        assert!((stats.completion_ratio() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_board_ratio() {
        let board = Board::new("b1", "Board", Utc::now());
        assert_eq!(BoardStats::compute(&board, Utc::now()).completion_ratio(), 0.0);
    }
}
