/// What a page shows while and after it loads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(String),
}
