use crate::pagination::PageRequest;

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    FetchPage(PageRequest),
}
