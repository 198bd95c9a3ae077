//! Qualification of inner type references in method signatures.
//!
//! A method that spells `Kind` where `Kind` is an enum nested in `Base` must be
//! emitted as `Base::Kind`. Matching is textual: a candidate is found as a whole
//! word and skipped when it is already part of a qualified name, that is when
//! `::` sits right before or right after it.

use crate::types::{ClassInfo, ClassTemplateInfo, MethodInfo};
use regex::Regex;
use tracing::{trace, warn};

/// Inner type names declared by one class, ready for matching
#[derive(Debug)]
pub struct InnerTypes {
    owner: String,
    candidates: Vec<Candidate>,
}

#[derive(Debug)]
struct Candidate {
    segment: String,
    pattern: Regex,
}

impl InnerTypes {
    /// Inner classes, typedefs and named enums of `class`
    pub fn of(class: &ClassInfo) -> Self {
        let names = class
            .inner_classes
            .keys()
            .chain(class.typedefs.keys())
            .chain(
                class
                    .enums
                    .iter()
                    .filter(|e| !e.anonymous)
                    .map(|e| &e.name),
            );

        let mut candidates: Vec<Candidate> = Vec::new();
        for name in names {
            let segment = unqualified(name);
            if segment.is_empty() || candidates.iter().any(|c| c.segment == segment) {
                continue;
            }
            match Regex::new(&format!(r"\b{}\b", regex::escape(segment))) {
                Ok(pattern) => candidates.push(Candidate {
                    segment: segment.to_string(),
                    pattern,
                }),
                Err(e) => warn!("Skipping inner type '{name}' of {}: {e}", class.name),
            }
        }

        Self {
            owner: class.name.clone(),
            candidates,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Unqualified names this scope rewrites
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.candidates.iter().map(|c| c.segment.as_str())
    }

    /// Rewrite one type string; template parameter names are never candidates
    pub fn qualify(&self, ty: &str, template_params: &[String]) -> Option<String> {
        let mut current: Option<String> = None;

        for candidate in &self.candidates {
            if template_params.iter().any(|p| *p == candidate.segment) {
                continue;
            }
            let text = current.as_deref().unwrap_or(ty);
            if let Some(rewritten) = qualify_word(text, &candidate.pattern, &self.owner) {
                current = Some(rewritten);
            }
        }

        current
    }

    /// Rewrite every argument and return type of `class`'s methods, static
    /// methods and constructors. Returns the number of type strings changed.
    pub fn apply(&self, class: &mut ClassInfo, template_params: &[String]) -> usize {
        if self.is_empty() {
            return 0;
        }

        let mut changed = 0;
        for method in class.callables_mut() {
            let MethodInfo {
                name,
                args,
                return_type,
                ..
            } = method;
            let slots = args
                .iter_mut()
                .map(|arg| &mut arg.ty)
                .chain(std::iter::once(return_type));

            for slot in slots {
                let Some(ty) = slot.as_deref() else {
                    continue;
                };
                if let Some(rewritten) = self.qualify(ty, template_params) {
                    trace!("{name}: '{ty}' -> '{rewritten}'");
                    *slot = Some(rewritten);
                    changed += 1;
                }
            }
        }
        changed
    }
}

fn unqualified(name: &str) -> &str {
    name.rsplit("::").next().unwrap_or(name)
}

/// Prefix every whole-word match that is not part of a qualified name with
/// `owner::`
fn qualify_word(text: &str, pattern: &Regex, owner: &str) -> Option<String> {
    let mut out = String::new();
    let mut last = 0;

    for found in pattern.find_iter(text) {
        if text[..found.start()].ends_with("::") || text[found.end()..].starts_with("::") {
            continue;
        }
        out.push_str(&text[last..found.start()]);
        out.push_str(owner);
        out.push_str("::");
        out.push_str(found.as_str());
        last = found.end();
    }

    if last == 0 {
        return None;
    }
    out.push_str(&text[last..]);
    Some(out)
}

/// Qualify inner type references across a whole module.
///
/// Each class's own inner types are applied to its methods before any other
/// class's, so a class's own `Kind` wins over a same-named `Kind` elsewhere.
/// Classes are visited first, then templates. Returns the number of type
/// strings changed.
pub fn qualify_module(classes: &mut [ClassInfo], templates: &mut [ClassTemplateInfo]) -> usize {
    let scopes: Vec<InnerTypes> = classes
        .iter()
        .chain(templates.iter().map(|t| &t.class))
        .map(InnerTypes::of)
        .collect();

    let owners: Vec<(&mut ClassInfo, Vec<String>)> = classes
        .iter_mut()
        .map(|c| (c, Vec::new()))
        .chain(templates.iter_mut().map(|t| {
            let params = t.param_names();
            (&mut t.class, params)
        }))
        .collect();

    let mut changed = 0;
    for (position, (class, params)) in owners.into_iter().enumerate() {
        let own = &scopes[position];
        changed += own.apply(class, &params);

        for other in &scopes {
            if other.owner() == own.owner() {
                continue;
            }
            changed += other.apply(class, &params);
        }
    }
    changed
}
