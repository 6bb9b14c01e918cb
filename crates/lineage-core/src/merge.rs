//! Member-table merge helpers used by the builder for statics and mixins

use crate::value::MemberMap;

/// Shallow-copy the entries of each source onto `dest`, in order: later
/// sources overwrite earlier ones. Returns `dest` itself. An absent `dest`
/// passes through as a no-op rather than an error, for callers that apply
/// a table conditionally.
pub fn assign<'a>(
    dest: Option<&'a mut MemberMap>,
    sources: &[&MemberMap],
) -> Option<&'a mut MemberMap> {
    let dest = dest?;
    for source in sources {
        for (key, value) in source.iter() {
            dest.insert(key.clone(), value.clone());
        }
    }
    Some(dest)
}

/// Copy only the entries of `src` whose keys are not already present on
/// `dest`. Existing entries are never overwritten.
pub fn assign_if_absent(dest: &mut MemberMap, src: &MemberMap) {
    for (key, value) in src.iter() {
        dest.entry(key.clone()).or_insert_with(|| value.clone());
    }
}
