//! Recursive (text, entities) → markup renderer shared by both syntaxes.
//!
//! Entities are flat offset/length records; nesting is rebuilt at render time
//! purely from offset containment. The entity list is sorted by offset and
//! walked with a cursor:
//!
//! - an entity starting before the cursor was already covered by an earlier
//!   sibling and is skipped;
//! - text between the cursor and the next entity is emitted quoted;
//! - an entity renders the later entities starting inside it as children,
//!   with its end clipped to the parent's bound;
//! - an entity with a negative offset is skipped, one starting past the
//!   bound is clipped to it and renders empty.
//!
//! This never fails, whatever the order, overlap or range of the entities.

use crate::decoration::Decoration;
use crate::entity::MessageEntity;
use crate::options::Options;
use crate::utf16::Utf16Text;

/// Renders `text` with `entities` applied, using `decoration` for the syntax.
pub fn unparse<D>(decoration: &D, text: &str, entities: &[MessageEntity], options: &Options) -> String
where
    D: Decoration + ?Sized,
{
    let units = Utf16Text::new(text);

    let mut sorted: Vec<&MessageEntity> = entities.iter().collect();
    // stable: ties keep their original order
    sorted.sort_by_key(|e| e.offset);

    let renderer = Renderer { decoration, units: &units, options };
    let mut out = String::with_capacity(text.len() + entities.len() * 16);
    renderer.render(&sorted, 0, units.len(), &mut out);
    out
}

struct Renderer<'a, D: ?Sized> {
    decoration: &'a D,
    units: &'a Utf16Text,
    options: &'a Options,
}

/// Negative lengths count as zero.
fn to_index(value: i32) -> usize {
    usize::try_from(value).unwrap_or(0)
}

impl<D: Decoration + ?Sized> Renderer<'_, D> {
    fn render(&self, entities: &[&MessageEntity], offset: usize, limit: usize, out: &mut String) {
        let mut position = offset;

        for (index, entity) in entities.iter().enumerate() {
            let Ok(start) = usize::try_from(entity.offset) else {
                log::debug!(
                    "[unparse] skipping {} at negative offset {}",
                    entity.kind.name(), entity.offset
                );
                continue;
            };
            if start < position {
                log::debug!(
                    "[unparse] skipping {} at {} (cursor already at {position})",
                    entity.kind.name(), entity.offset
                );
                continue;
            }
            // a start past the bound renders an empty entity at the bound
            let start = start.min(limit);

            if start > position {
                self.quote(position, start, out);
            }

            let end = start.saturating_add(to_index(entity.length)).min(limit);
            let children: Vec<&MessageEntity> = entities[index + 1..]
                .iter()
                .copied()
                .filter(|e| to_index(e.offset) < end)
                .collect();

            let mut inner = String::new();
            self.render(&children, start, end, &mut inner);
            let raw = self.units.slice(start, end);
            out.push_str(&self.decoration.apply(entity, &inner, &raw, self.options));

            position = end;
        }

        if position < limit {
            self.quote(position, limit, out);
        }
    }

    fn quote(&self, start: usize, end: usize, out: &mut String) {
        out.push_str(&self.decoration.quote(&self.units.slice(start, end)));
    }
}
