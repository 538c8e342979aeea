//! Attribute closure under a set of functional dependencies

use super::FunctionalDependency;
use std::collections::BTreeSet;

/// Closure of `attrs`: every attribute they determine under `fds`
///
/// Grows the set until no dependency whose determinants are already inside
/// it adds anything new.
pub fn closure<I, S>(attrs: I, fds: &[FunctionalDependency]) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut closure: BTreeSet<String> = attrs.into_iter().map(Into::into).collect();
    let mut changed = true;

    while changed {
        changed = false;
        for fd in fds {
            if !fd.determinants.is_subset(&closure) {
                continue;
            }
            for attr in &fd.dependents {
                if closure.insert(attr.clone()) {
                    changed = true;
                }
            }
        }
    }

    closure
}

/// Whether `fd` follows from `fds`
pub fn implies(fds: &[FunctionalDependency], fd: &FunctionalDependency) -> bool {
    fd.dependents
        .is_subset(&closure(fd.determinants.iter().cloned(), fds))
}

/// Whether `attrs` determine every attribute of `universe`
pub fn is_superkey(attrs: &BTreeSet<String>, universe: &[String], fds: &[FunctionalDependency]) -> bool {
    let closure = closure(attrs.iter().cloned(), fds);
    universe.iter().all(|attr| closure.contains(attr))
}
