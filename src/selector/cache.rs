//! Per-thread cache of compiled selectors

use super::Selector;
use crate::error::Result;
use lru::LruCache;
use std::cell::RefCell;
use std::num::NonZeroUsize;

const CACHE_SIZE: NonZeroUsize = match NonZeroUsize::new(256) {
    Some(size) => size,
    None => NonZeroUsize::MIN,
};

thread_local! {
    static COMPILED: RefCell<LruCache<Box<str>, Selector>> = RefCell::new(LruCache::new(CACHE_SIZE));
}

/// Look up `source`, compiling and caching it on a miss.
/// Failed compilations are not cached.
pub(super) fn get_or_compile(
    source: &str,
    compile: impl FnOnce(&str) -> Result<Selector>,
) -> Result<Selector> {
    if let Some(hit) = COMPILED.with(|cache| cache.borrow_mut().get(source).cloned()) {
        return Ok(hit);
    }

    let selector = compile(source)?;
    COMPILED.with(|cache| cache.borrow_mut().put(source.into(), selector.clone()));
    Ok(selector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::cell::Cell;

    #[test]
    fn test_second_lookup_hits_cache() {
        let calls = Cell::new(0);
        let compile = |s: &str| {
            calls.set(calls.get() + 1);
            super::super::parser::parse(s)
        };

        let first = get_or_compile("li.cache-hit-test", compile).unwrap();
        let second = get_or_compile("li.cache-hit-test", compile).unwrap();
        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_errors_not_cached() {
        let calls = Cell::new(0);
        let compile = |s: &str| {
            calls.set(calls.get() + 1);
            super::super::parser::parse(s)
        };

        assert!(matches!(
            get_or_compile("a b", compile),
            Err(Error::InvalidSelector { .. })
        ));
        assert!(get_or_compile("a b", compile).is_err());
        assert_eq!(calls.get(), 2);
    }
}
