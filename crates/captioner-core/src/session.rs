//! Shared access to ONNX Runtime sessions.

use std::sync::{Mutex, MutexGuard};

/// Lock a model session, recovering it if a previous holder panicked.
///
/// The poison flag is cleared so later requests lock normally.
pub(crate) fn lock_session<'a, T>(session: &'a Mutex<T>, model: &str) -> MutexGuard<'a, T> {
    match session.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("{} session lock poisoned by a panicked request, recovering", model);
            session.clear_poison();
            poisoned.into_inner()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_lock_after_panic_recovers() {
        let session = Arc::new(Mutex::new(vec![1, 2]));

        let shared = Arc::clone(&session);
        let result = std::thread::spawn(move || {
            let mut guard = shared.lock().unwrap();
            guard.push(3);
            panic!("inference panicked");
        })
        .join();
        assert!(result.is_err());
        assert!(session.is_poisoned());

        let guard = lock_session(&session, "test");
        assert_eq!(*guard, vec![1, 2, 3]);
        drop(guard);

        assert!(!session.is_poisoned());
        assert_eq!(*lock_session(&session, "test"), vec![1, 2, 3]);
    }

    #[test]
    fn test_lock_unpoisoned() {
        let session = Mutex::new(7);
        *lock_session(&session, "test") += 1;
        assert_eq!(*session.lock().unwrap(), 8);
    }
}
