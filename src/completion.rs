//! Bridges completion-based operations into `async` code

use tokio::sync::oneshot;

/// A boxed completion handler, as accepted by stores and the cache loader
pub type Completion<T> = Box<dyn FnOnce(T) + Send>;

/// Starts a completion-based operation and waits for its completion to fire.
///
/// Returns `None` when the completion was dropped without being called, which
/// is what happens to operations issued by a loader that has since been
/// dropped.
///
/// # Example
///
/// ```ignore
/// let cached = completed(|completion| store.retrieve(completion)).await;
/// ```
pub async fn completed<T, F>(start: F) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce(Completion<T>),
{
    let (tx, rx) = oneshot::channel();
    start(Box::new(move |value| {
        let _ = tx.send(value);
    }));
    rx.await.ok()
}
