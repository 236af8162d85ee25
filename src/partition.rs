use std::collections::BTreeMap;

/// Errors raised by [`partition`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PartitionError {
    /// Target chunk size must be at least one item.
    #[error("invalid target size: {0} (must be > 0)")]
    InvalidTargetSize(usize),
}

pub type Result<T> = std::result::Result<T, PartitionError>;

/// How groups are packed into chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// One-step look-ahead: a group that would push the chunk further from
    /// the target than leaving it out is deferred to the next chunk.
    Balanced,
    /// Keep adding groups until the chunk reaches the target.
    Greedy,
}

/// A named entry to be partitioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item<T> {
    pub key: String,
    pub payload: T,
}

impl<T> Item<T> {
    pub fn new(key: impl Into<String>, payload: T) -> Self {
        Self {
            key: key.into(),
            payload,
        }
    }
}

/// A contiguous run of whole letter groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk<T> {
    pub label: String,
    pub items: Vec<Item<T>>,
}

impl<T> Chunk<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

/// Group letter for a key: its first character, uppercased.
///
/// An empty key groups under the empty string.
pub fn group_letter(key: &str) -> String {
    key.chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default()
}

/// Collapse the ordered letters of a chunk into its label.
pub fn range_label(letters: &[String]) -> String {
    match letters {
        [] => String::new(),
        [only] => only.clone(),
        [first, .., last] => format!("{}-{}", first, last),
    }
}

/// Items accumulated so far plus the letters they came from.
struct OpenChunk<T> {
    items: Vec<Item<T>>,
    letters: Vec<String>,
}

impl<T> OpenChunk<T> {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            letters: Vec::new(),
        }
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn push_group(&mut self, letter: String, items: Vec<Item<T>>) {
        self.items.extend(items);
        self.letters.push(letter);
    }

    /// Emit the open chunk into `out` and start over. Empty chunks are dropped.
    fn close_into(&mut self, out: &mut Vec<Chunk<T>>) {
        if self.items.is_empty() {
            return;
        }
        let letters = std::mem::take(&mut self.letters);
        out.push(Chunk {
            label: range_label(&letters),
            items: std::mem::take(&mut self.items),
        });
    }
}

/// Partition `items` (sorted by key) into chunks of roughly `target_size`.
///
/// Every item lands in exactly one chunk, chunks come out in ascending
/// letter order, and no letter group is split across two chunks. The last
/// chunk may be smaller than the target.
pub fn partition<T>(items: Vec<Item<T>>, target_size: usize, mode: Mode) -> Result<Vec<Chunk<T>>> {
    if target_size < 1 {
        return Err(PartitionError::InvalidTargetSize(target_size));
    }

    let mut groups: BTreeMap<String, Vec<Item<T>>> = BTreeMap::new();
    for item in items {
        groups.entry(group_letter(&item.key)).or_default().push(item);
    }

    let mut chunks = Vec::new();
    let mut open = OpenChunk::new();

    for (letter, group) in groups {
        match mode {
            Mode::Greedy => {
                open.push_group(letter, group);
                if open.len() >= target_size {
                    open.close_into(&mut chunks);
                }
            }
            Mode::Balanced => {
                let chunk_len = open.len();
                let combined_len = chunk_len + group.len();

                if combined_len < target_size {
                    open.push_group(letter, group);
                    continue;
                }

                // Midpoint of the sizes with and without the group, compared
                // doubled to stay in integers.
                let defer = combined_len + chunk_len > 2 * target_size;

                if defer {
                    open.close_into(&mut chunks);
                    open.push_group(letter, group);
                } else {
                    open.push_group(letter, group);
                }

                if open.len() >= target_size {
                    open.close_into(&mut chunks);
                }
            }
        }
    }

    open.close_into(&mut chunks);
    Ok(chunks)
}
