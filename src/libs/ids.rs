use parking_lot::Mutex;
use std::sync::OnceLock;
use ulid::{Generator, Ulid};

static GENERATOR: OnceLock<Mutex<Generator>> = OnceLock::new();

/// Returns a new record key. Keys generated by this process sort in creation
/// order, including within the same millisecond.
pub fn next_id() -> String {
    let generator = GENERATOR.get_or_init(|| Mutex::new(Generator::new()));
    // Overflow of the random component within one millisecond falls back to a
    // plain ULID.
    let id = generator.lock().generate().unwrap_or_else(|_| Ulid::new());
    id.to_string()
}

#[cfg(test)]
mod tests {
    use super::next_id;

    #[test]
    fn ids_are_monotonic() {
        let ids: Vec<String> = (0..100).map(|_| next_id()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert_eq!(ids[0].len(), 26);
    }
}
