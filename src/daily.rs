use crate::models::{Goals, Task, TaskType};

/// Share of today's tasks that are done, in percent. Zero when there are no tasks.
pub fn progress(tasks: &[Task]) -> f64 {
    if tasks.is_empty() {
        return 0.0;
    }
    let completed = tasks.iter().filter(|t| t.completed).count();
    completed as f64 / tasks.len() as f64 * 100.0
}

pub fn completed_of_type(tasks: &[Task], task_type: TaskType) -> usize {
    tasks
        .iter()
        .filter(|t| t.completed && t.task_type == task_type)
        .count()
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryProgress {
    pub task_type: TaskType,
    pub completed: usize,
    pub target: i64,
}

impl CategoryProgress {
    // Goals are advisory; going over target is fine.
    pub fn met(&self) -> bool {
        self.completed as i64 >= self.target
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailySummary {
    pub completed: usize,
    pub total: usize,
    pub progress: f64,
    pub categories: Vec<CategoryProgress>,
}

impl DailySummary {
    pub fn new(tasks: &[Task], goals: &Goals) -> Self {
        let categories = TaskType::ALL
            .into_iter()
            .map(|task_type| CategoryProgress {
                task_type,
                completed: completed_of_type(tasks, task_type),
                target: goals.target(task_type),
            })
            .collect();

        Self {
            completed: tasks.iter().filter(|t| t.completed).count(),
            total: tasks.len(),
            progress: progress(tasks),
            categories,
        }
    }

    pub fn headline(&self) -> String {
        if self.total > 0 && self.completed == self.total {
            "All done! Great work today.".to_string()
        } else {
            format!("{} of {} tasks complete", self.completed, self.total)
        }
    }
}
