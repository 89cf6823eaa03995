//! Deterministic corrections applied to a source's link graph before closure.
//!
//! Each source owns an ordered list of `Patch` values. They run strictly in
//! declared order: later patches may rely on an earlier one having normalized
//! their target.
//!
//! Resolving the hymn a patch targets is strict. Zero or several hymns owning
//! one reference means the merge step broke its contract, so it is fatal. The
//! one soft case is `RemoveLink` not finding the link it wants to remove: the
//! upstream data has changed under the patch, which is reported as an
//! `OBSOLETE_PATCH_TARGET` warning so the patch can be retired.

use tracing::{debug, info};

use crate::errors::{ErrorLog, ErrorType, PipelineError, ReconcileError, Result};
use crate::models::{format_references, Hymn, Relation, SongLink, SongReference};
use crate::sources::Source;

/// One correction. Data only; `Patcher` gives it meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch {
    /// Append `link` to the owner's relation.
    AddLink {
        owner: SongReference,
        relation: Relation,
        link: SongLink,
    },
    /// Remove every entry pointing at one of `targets`.
    RemoveLink {
        owner: SongReference,
        relation: Relation,
        targets: Vec<SongReference>,
    },
    /// Replace the owner's relation with `links`, and point each target's
    /// relation back at the owner.
    ResetLink {
        owner: SongReference,
        relation: Relation,
        links: Vec<SongLink>,
    },
    /// Empty the owner's relation.
    ClearLink {
        owner: SongReference,
        relation: Relation,
    },
    /// Drop an alias; drop the hymn too if it was the last one.
    RemoveReference { reference: SongReference },
}

impl Patch {
    pub fn add_link(owner: SongReference, relation: Relation, link: SongLink) -> Self {
        Patch::AddLink {
            owner,
            relation,
            link,
        }
    }

    pub fn remove_link(owner: SongReference, relation: Relation, targets: Vec<SongReference>) -> Self {
        Patch::RemoveLink {
            owner,
            relation,
            targets,
        }
    }

    pub fn reset_link(owner: SongReference, relation: Relation, links: Vec<SongLink>) -> Self {
        Patch::ResetLink {
            owner,
            relation,
            links,
        }
    }

    pub fn clear_link(owner: SongReference, relation: Relation) -> Self {
        Patch::ClearLink { owner, relation }
    }

    pub fn remove_reference(reference: SongReference) -> Self {
        Patch::RemoveReference { reference }
    }

    /// Reference the patch resolves first.
    pub fn target(&self) -> &SongReference {
        match self {
            Patch::AddLink { owner, .. }
            | Patch::RemoveLink { owner, .. }
            | Patch::ResetLink { owner, .. }
            | Patch::ClearLink { owner, .. } => owner,
            Patch::RemoveReference { reference } => reference,
        }
    }
}

/// Find the single hymn owning `reference`.
pub fn resolve(hymns: &[Hymn], reference: &SongReference, context: &str) -> Result<usize> {
    let matches: Vec<usize> = hymns
        .iter()
        .enumerate()
        .filter(|(_, hymn)| hymn.has_reference(reference))
        .map(|(i, _)| i)
        .collect();

    match matches.as_slice() {
        [index] => Ok(*index),
        [] => Err(ReconcileError::UnresolvedReference {
            reference: reference.clone(),
            context: context.to_string(),
        }),
        _ => Err(ReconcileError::AmbiguousReference {
            reference: reference.clone(),
            matches: matches.len(),
        }),
    }
}

/// Applies one source's patches in order.
pub struct Patcher {
    source: Source,
    patches: Vec<Patch>,
}

impl Patcher {
    pub fn new(source: Source, patches: Vec<Patch>) -> Self {
        Self { source, patches }
    }

    /// Patcher carrying the source's own correction list.
    pub fn for_source(source: Source) -> Self {
        Self::new(source, source.patches())
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Apply every patch in declared order. Returns the number applied.
    pub fn apply(&self, hymns: &mut Vec<Hymn>, errors: &mut ErrorLog) -> Result<usize> {
        for patch in &self.patches {
            debug!(source = %self.source, target = %patch.target(), "applying patch");
            self.apply_one(patch, hymns, errors)?;
        }
        info!(
            source = %self.source,
            patches = self.patches.len(),
            hymns = hymns.len(),
            "patches applied"
        );
        Ok(self.patches.len())
    }

    fn apply_one(&self, patch: &Patch, hymns: &mut Vec<Hymn>, errors: &mut ErrorLog) -> Result<()> {
        match patch {
            Patch::AddLink {
                owner,
                relation,
                link,
            } => {
                let index = resolve(hymns, owner, "add link owner")?;
                hymns[index].links_mut(*relation).push(link.clone());
            }
            Patch::RemoveLink {
                owner,
                relation,
                targets,
            } => {
                let index = resolve(hymns, owner, "remove link owner")?;
                self.remove_links(&mut hymns[index], owner, *relation, targets, errors);
            }
            Patch::ResetLink {
                owner,
                relation,
                links,
            } => {
                let index = resolve(hymns, owner, "reset link owner")?;
                *hymns[index].links_mut(*relation) = links.clone();

                let back = SongLink::new(owner.clone(), relation.generic_label());
                for link in links {
                    let target = resolve(hymns, &link.reference, "reset link target")?;
                    *hymns[target].links_mut(*relation) = vec![back.clone()];
                }
            }
            Patch::ClearLink { owner, relation } => {
                let index = resolve(hymns, owner, "clear link owner")?;
                hymns[index].links_mut(*relation).clear();
            }
            Patch::RemoveReference { reference } => {
                let index = resolve(hymns, reference, "remove reference")?;
                let hymn = &mut hymns[index];
                hymn.references.retain(|r| r != reference);
                if hymn.references.is_empty() {
                    debug!(reference = %reference, "removed last alias, dropping hymn");
                    hymns.remove(index);
                }
            }
        }
        Ok(())
    }

    fn remove_links(
        &self,
        hymn: &mut Hymn,
        owner: &SongReference,
        relation: Relation,
        targets: &[SongReference],
        errors: &mut ErrorLog,
    ) {
        let links = hymn.links_mut(relation);
        for target in targets {
            let before = links.len();
            links.retain(|link| &link.reference != target);
            if links.len() == before {
                errors.push(PipelineError::warning(
                    ErrorType::ObsoletePatchTarget,
                    self.source,
                    vec![format!(
                        "tried to remove {target} from {owner} {relation} but didn't find it"
                    )],
                ));
            }
        }
        debug!(
            owner = %owner,
            remaining = %format_references(links.iter().map(|l| &l.reference)),
            "links removed"
        );
    }
}
