use bibcat_core::CatalogStore;
use unicode_normalization::UnicodeNormalization;

use crate::error::{RecordError, Result};

/// Used when a name has no ASCII-representable characters at all.
const FALLBACK_SLUG: &str = "author";

const SUFFIX_MAX: u32 = 9999;

/// Lowercased ASCII slug: accents are stripped through NFKD, characters
/// other than letters, digits, `_`, `-` and whitespace are dropped, runs of
/// `-`/whitespace collapse to one `-`, and leading/trailing `-`/`_` go.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.nfkd().filter(char::is_ascii) {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else if c == '-' || c.is_whitespace() {
            pending_dash = true;
        }
    }

    slug.trim_matches(['-', '_']).to_string()
}

/// Produces the numeric suffix for a colliding slug, in `1..=9999`.
pub trait SuffixSource {
    fn next_suffix(&mut self) -> u32;
}

/// Random suffixes drawn from v4 UUID entropy.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSuffix;

impl SuffixSource for RandomSuffix {
    fn next_suffix(&mut self) -> u32 {
        (uuid::Uuid::new_v4().as_u128() % u128::from(SUFFIX_MAX)) as u32 + 1
    }
}

impl<F: FnMut() -> u32> SuffixSource for F {
    fn next_suffix(&mut self) -> u32 {
        self()
    }
}

/// Hands out author slugs that are not yet taken in the store.
#[derive(Debug)]
pub struct SlugAllocator<G = RandomSuffix> {
    max_attempts: u32,
    suffixes: G,
}

impl SlugAllocator<RandomSuffix> {
    pub fn new(max_attempts: u32) -> Self {
        Self::with_suffixes(max_attempts, RandomSuffix)
    }
}

impl<G: SuffixSource> SlugAllocator<G> {
    pub fn with_suffixes(max_attempts: u32, suffixes: G) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            suffixes,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the base slug of `name` if free, otherwise the first free
    /// `base-N` candidate. Gives up with [`RecordError::SlugAllocation`]
    /// after `max_attempts` suffixed candidates.
    pub fn allocate<S: CatalogStore + ?Sized>(&mut self, store: &S, name: &str) -> Result<String> {
        let mut base = slugify(name);
        if base.is_empty() {
            base = FALLBACK_SLUG.to_string();
        }

        if !store.slug_exists(&base)? {
            return Ok(base);
        }

        for attempt in 1..=self.max_attempts {
            let candidate = format!("{base}-{}", self.suffixes.next_suffix());
            if !store.slug_exists(&candidate)? {
                tracing::debug!(name, slug = %candidate, attempt, "slug collision resolved");
                return Ok(candidate);
            }
        }

        Err(RecordError::SlugAllocation {
            name: name.to_string(),
            attempts: self.max_attempts,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use bibcat_core::{MemoryStore, NewAuthor};

    use super::*;
    use crate::error::IngestError;

    #[test]
    fn slugify_basic_names() {
        assert_eq!(slugify("Jane Doe"), "jane-doe");
        assert_eq!(slugify("Jane  Doe"), "jane-doe");
        assert_eq!(slugify("Doe, Jane"), "doe-jane");
        assert_eq!(slugify("O'Brien, P."), "obrien-p");
    }

    #[test]
    fn slugify_transliterates_accents() {
        assert_eq!(slugify("José Müller"), "jose-muller");
        assert_eq!(slugify("Ångström, A"), "angstrom-a");
    }

    #[test]
    fn slugify_trims_and_collapses_separators() {
        assert_eq!(slugify("  --Hello_World--  "), "hello_world");
        assert_eq!(slugify("a - - b"), "a-b");
        assert_eq!(slugify("_-a"), "a");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn random_suffix_stays_in_range() {
        let mut source = RandomSuffix;
        for _ in 0..1000 {
            let n = source.next_suffix();
            assert!((1..=9999).contains(&n));
        }
    }

    #[test]
    fn free_base_slug_is_used() {
        let store = MemoryStore::new();
        let mut allocator = SlugAllocator::new(10);
        assert_eq!(allocator.allocate(&store, "Jane Doe").unwrap(), "jane-doe");
    }

    #[test]
    fn colliding_names_get_distinct_slugs() {
        let mut store = MemoryStore::new();
        let mut next: u32 = 0;
        let mut allocator = SlugAllocator::with_suffixes(10, move || {
            next += 1;
            next
        });

        let first = allocator.allocate(&store, "Jane Doe").unwrap();
        store.create_author(&NewAuthor::new("Jane Doe", first.clone())).unwrap();
        let second = allocator.allocate(&store, "Jane  Doe").unwrap();

        assert_eq!(first, "jane-doe");
        assert_eq!(second, "jane-doe-1");
    }

    #[test]
    fn taken_suffixes_are_retried() {
        let mut store = MemoryStore::new();
        store.create_author(&NewAuthor::new("Jane Doe", "jane-doe")).unwrap();
        store.create_author(&NewAuthor::new("Jane  Doe", "jane-doe-5")).unwrap();

        let mut suffixes = vec![5u32, 5, 6].into_iter();
        let mut allocator = SlugAllocator::with_suffixes(10, move || suffixes.next().unwrap_or(9999));
        assert_eq!(allocator.allocate(&store, "Jane   Doe").unwrap(), "jane-doe-6");
    }

    #[test]
    fn exhaustion_is_a_record_error() {
        let mut store = MemoryStore::new();
        store.create_author(&NewAuthor::new("Jane Doe", "jane-doe")).unwrap();
        store.create_author(&NewAuthor::new("Jane  Doe", "jane-doe-7")).unwrap();

        let mut allocator = SlugAllocator::with_suffixes(3, || 7u32);
        let err = allocator.allocate(&store, "Jane   Doe").unwrap_err();
        assert!(matches!(
            err,
            IngestError::Record(RecordError::SlugAllocation { attempts: 3, .. })
        ));
    }

    #[test]
    fn empty_slug_falls_back() {
        let store = MemoryStore::new();
        let mut allocator = SlugAllocator::new(10);
        assert_eq!(allocator.allocate(&store, "张伟").unwrap(), "author");
    }
}
