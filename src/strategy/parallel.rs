//! Parallel batch parsing
//!
//! Uses Rayon to parse many documents against the same programs.

use rayon::prelude::*;

use crate::error::Result;
use crate::query::Program;

/// Parse every input against `programs` in parallel.
///
/// Results come back in input order; one malformed input does not affect
/// the others.
pub fn parse_many<T>(inputs: &[T], programs: &[Program]) -> Vec<Result<crate::Store>>
where
    T: AsRef<[u8]> + Sync,
{
    inputs
        .par_iter()
        .map(|input| crate::parse(input.as_ref(), programs))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::query::{Query, Save};

    #[test]
    fn test_parse_many_preserves_order() {
        let program = Query::all("li", Save::only_text_content()).build().unwrap();
        let inputs: Vec<String> = (0..32)
            .map(|i| format!("<ul>{}</ul>", "<li>x</li>".repeat(i % 4)))
            .collect();

        let stores = parse_many(&inputs, &[program]);
        assert_eq!(stores.len(), 32);
        for (i, store) in stores.iter().enumerate() {
            assert_eq!(store.as_ref().unwrap().len(), 1 + i % 4);
        }
    }

    #[test]
    fn test_parse_many_isolates_failures() {
        let program = Query::all("p", Save::none()).build().unwrap();
        let inputs: [&[u8]; 3] = [b"<p>a</p>", b"", b"<p>b</p><p>c</p>"];

        let stores = parse_many(&inputs, &[program]);
        assert_eq!(stores[0].as_ref().unwrap().len(), 2);
        assert!(matches!(stores[1], Err(Error::MalformedInput(_))));
        assert_eq!(stores[2].as_ref().unwrap().len(), 3);
    }
}
