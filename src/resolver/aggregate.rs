//! Final merge of directly-compatible and closure-promoted records.

use std::collections::HashSet;

use crate::package::{Package, PackageMetadata};

/// Merge the two record collections into the output list: dedupe by
/// identifier keeping the first occurrence, then sort by identifier with
/// plain byte-wise string order. This is the only point where the final
/// order is fixed; upstream stages may complete out of order.
pub fn finalize(direct: Vec<PackageMetadata>, promoted: Vec<PackageMetadata>) -> Vec<Package> {
    let mut seen = HashSet::new();
    let mut packages: Vec<Package> = Vec::with_capacity(direct.len() + promoted.len());

    for metadata in direct.into_iter().chain(promoted) {
        if seen.insert(metadata.identity.id.clone()) {
            packages.push(metadata.into());
        }
    }

    packages.sort_by(|a, b| a.id.cmp(&b.id));
    packages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::metadata;

    #[test]
    fn test_finalize_sorts_by_identifier() {
        let direct = vec![metadata("Zeta", &[]), metadata("Alpha", &[])];
        let promoted = vec![metadata("Mid", &[])];

        let packages = finalize(direct, promoted);
        let ids: Vec<&str> = packages.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["Alpha", "Mid", "Zeta"]);
    }

    #[test]
    fn test_finalize_sort_is_ordinal() {
        // Byte-wise order puts uppercase before lowercase
        let direct = vec![metadata("apple", &[]), metadata("Banana", &[])];

        let packages = finalize(direct, vec![]);
        let ids: Vec<&str> = packages.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["Banana", "apple"]);
    }

    #[test]
    fn test_finalize_dedupes_keeping_first() {
        let mut first = metadata("Dup", &[]);
        first.authors = "first".to_string();
        let mut second = metadata("Dup", &[]);
        second.authors = "second".to_string();

        let packages = finalize(vec![first], vec![second]);
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].authors, "first");
    }

    #[test]
    fn test_finalize_empty_input() {
        assert!(finalize(vec![], vec![]).is_empty());
    }
}
