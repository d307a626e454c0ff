use crate::pagination::Pagination;

use super::operation::Operation;

/// A model together with the operations its caller may perform on it.
#[derive(Debug, Clone)]
pub struct SingleModel<M> {
    model: M,
    operations: Vec<Operation>,
}

impl<M> SingleModel<M> {
    #[must_use]
    pub fn new(model: M, operations: Vec<Operation>) -> Self {
        Self { model, operations }
    }

    #[must_use]
    pub fn model(&self) -> &M {
        &self.model
    }

    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    #[must_use]
    pub fn into_model(self) -> M {
        self.model
    }
}

/// What a collection getter returns: one window of models and the size of
/// the whole collection.
#[derive(Debug, Clone)]
pub struct PageItems<M> {
    items: Vec<M>,
    total: u64,
}

impl<M> PageItems<M> {
    #[must_use]
    pub fn new(items: Vec<M>, total: u64) -> Self {
        Self { items, total }
    }

    #[must_use]
    pub fn items(&self) -> &[M] {
        &self.items
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    #[must_use]
    pub fn into_items(self) -> Vec<M> {
        self.items
    }
}

/// One page of a collection, ready for the page writer.
#[derive(Debug, Clone)]
pub struct Page<M> {
    items: Vec<SingleModel<M>>,
    total: u64,
    pagination: Pagination,
    path: String,
    operations: Vec<Operation>,
}

impl<M> Page<M> {
    #[must_use]
    pub fn new(
        items: Vec<SingleModel<M>>,
        total: u64,
        pagination: Pagination,
        path: String,
        operations: Vec<Operation>,
    ) -> Self {
        Self {
            items,
            total,
            pagination,
            path,
            operations,
        }
    }

    #[must_use]
    pub fn items(&self) -> &[SingleModel<M>] {
        &self.items
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    #[must_use]
    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    /// Collection path relative to the API base.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Collection-level operations, e.g. create.
    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.pagination.has_next(self.total)
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.pagination.has_previous()
    }
}

/// Outcome of a batch create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    path: String,
    identifiers: Vec<String>,
    item_paths: Vec<String>,
}

impl BatchResult {
    #[must_use]
    pub fn new(path: String, identifiers: Vec<String>, item_paths: Vec<String>) -> Self {
        Self {
            path,
            identifiers,
            item_paths,
        }
    }

    /// Collection path the items were created in.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    /// Paths of the created items, in input order.
    #[must_use]
    pub fn item_paths(&self) -> &[String] {
        &self.item_paths
    }
}
