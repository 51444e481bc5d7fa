//! The tag-ID dictionary (the TD preservation map value).

use crate::{
    container::block::ContentId,
    error::{Error, Result},
    record::tag::{Tag, Type},
};

/// A 3-byte tag identifier: the two tag characters plus the value type.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Key {
    tag: Tag,
    ty: Type,
}

impl Key {
    /// Creates a tag identifier.
    pub fn new(tag: Tag, ty: Type) -> Self {
        Self { tag, ty }
    }

    /// Returns the tag.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Returns the value type.
    pub fn ty(&self) -> Type {
        self.ty
    }
}

impl From<Key> for ContentId {
    fn from(key: Key) -> Self {
        let [b0, b1] = *key.tag.as_ref();
        (ContentId::from(b0) << 16) | (ContentId::from(b1) << 8) | ContentId::from(u8::from(key.ty))
    }
}

/// The tag-ID dictionary: each entry is the set of tag identifiers present
/// together on some record. Records refer to entries by index via the TL
/// data series.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TagSets(Vec<Vec<Key>>);

impl TagSets {
    /// Returns the entries.
    pub fn sets(&self) -> &[Vec<Key>] {
        &self.0
    }

    /// Returns the index of the given entry.
    pub fn position(&self, keys: &[Key]) -> Option<usize> {
        self.0.iter().position(|set| set == keys)
    }

    /// Returns the entry at the given index.
    pub fn get(&self, i: usize) -> Option<&[Key]> {
        self.0.get(i).map(|set| set.as_slice())
    }

    /// Adds an entry if not already present and returns its index.
    pub fn insert(&mut self, keys: Vec<Key>) -> usize {
        match self.position(&keys) {
            Some(i) => i,
            None => {
                self.0.push(keys);
                self.0.len() - 1
            }
        }
    }

    pub(crate) fn from_wire(src: &[u8]) -> Result<Self> {
        const NUL: u8 = 0x00;

        let mut sets = Vec::new();

        if src.is_empty() {
            return Ok(Self(sets));
        }

        let pieces: Vec<_> = src.split(|&b| b == NUL).collect();

        let Some((last, init)) = pieces.split_last() else {
            return Ok(Self(sets));
        };

        if !last.is_empty() {
            return Err(Error::Malformed(
                "tag set dictionary is not NUL-terminated".into(),
            ));
        }

        for piece in init {
            if piece.len() % 3 != 0 {
                return Err(Error::Malformed(format!(
                    "invalid tag set length: {}",
                    piece.len()
                )));
            }

            let keys = piece
                .chunks_exact(3)
                .map(|chunk| {
                    let ty = Type::try_from(chunk[2])
                        .map_err(|e| Error::Malformed(e.to_string()))?;
                    Ok(Key::new(Tag::new(chunk[0], chunk[1]), ty))
                })
                .collect::<Result<_>>()?;

            sets.push(keys);
        }

        Ok(Self(sets))
    }

    pub(crate) fn to_wire(&self) -> Vec<u8> {
        const NUL: u8 = 0x00;

        let mut dst = Vec::new();

        for set in &self.0 {
            for key in set {
                dst.extend_from_slice(key.tag.as_ref());
                dst.push(u8::from(key.ty));
            }

            dst.push(NUL);
        }

        dst
    }
}

impl FromIterator<Vec<Key>> for TagSets {
    fn from_iter<I: IntoIterator<Item = Vec<Key>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_round_trip() -> Result<()> {
        let sets: TagSets = [
            vec![
                Key::new(Tag::READ_GROUP, Type::String),
                Key::new(Tag::new(b'N', b'M'), Type::Int32),
            ],
            vec![],
            vec![Key::new(Tag::new(b'X', b'S'), Type::Int32)],
        ]
        .into_iter()
        .collect();

        let wire = sets.to_wire();
        assert_eq!(wire, b"RGZNMi\x00\x00XSi\x00");

        let actual = TagSets::from_wire(&wire)?;
        assert_eq!(actual, sets);

        Ok(())
    }

    #[test]
    fn test_from_wire_with_empty_input() -> Result<()> {
        assert!(TagSets::from_wire(&[])?.sets().is_empty());
        Ok(())
    }

    #[test]
    fn test_from_wire_with_invalid_length() {
        assert!(matches!(
            TagSets::from_wire(b"RG\x00"),
            Err(Error::Malformed(_))
        ));
    }

    #[test]
    fn test_insert_deduplicates() {
        let mut sets = TagSets::default();
        let keys = vec![Key::new(Tag::READ_GROUP, Type::String)];

        assert_eq!(sets.insert(keys.clone()), 0);
        assert_eq!(sets.insert(vec![]), 1);
        assert_eq!(sets.insert(keys), 0);
    }

    #[test]
    fn test_content_id() {
        let key = Key::new(Tag::new(b'X', b'S'), Type::Int32);
        let id = ContentId::from(key);
        assert_eq!(id, (0x58 << 16) | (0x53 << 8) | 0x69);
    }
}
