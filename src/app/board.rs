use crate::app::models::{Status, Task};

// Which tasks get drawn. The filter only hides cards; it never changes
// which tasks exist or what the column totals say.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Only(Status),
}

impl Filter {
    pub fn cycle(self) -> Filter {
        match self {
            Filter::All => Filter::Only(Status::Todo),
            Filter::Only(Status::Todo) => Filter::Only(Status::InProgress),
            Filter::Only(Status::InProgress) => Filter::Only(Status::Done),
            Filter::Only(Status::Done) => Filter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Only(status) => status.label(),
        }
    }

    fn admits(self, status: Status) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(only) => only == status,
        }
    }
}

// The in-memory board state: a cache of the server's task collection plus
// the active display filter. This is the only source of truth for drawing,
// and it changes only on the success paths of the four API operations.
#[derive(Debug, Default)]
pub struct Board {
    tasks: Vec<Task>,
    filter: Filter,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    // Swap in the authoritative collection from a list call.
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    // Patch one task's status in place after the server accepted the
    // change. No-op when the id is not in the collection.
    pub fn set_status(&mut self, id: i64, status: Status) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            task.status = status;
        }
    }

    // Drop the task with the given id after a confirmed server-side delete.
    pub fn remove(&mut self, id: i64) {
        self.tasks.retain(|t| t.id != id);
    }

    pub fn get(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    // The cards drawn in one column: narrowed by the active filter first,
    // then partitioned by status.
    pub fn column(&self, status: Status) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| self.filter.admits(t.status))
            .filter(|t| t.status == status)
            .collect()
    }

    // The total shown in a column header. Always computed over the full
    // unfiltered collection; the filter hides cards, not totals.
    pub fn count(&self, status: Status) -> usize {
        self.tasks.iter().filter(|t| t.status == status).count()
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn cycle_filter(&mut self) {
        self.filter = self.filter.cycle();
    }
}
