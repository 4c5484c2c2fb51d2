//! Resource fork header and map parser.
//!
//! Layout reference: Inside Macintosh, More Macintosh Toolbox, ch. 1
//! ("Resource Manager Reference", Resource File Format).

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::resource::{ResType, Resource, ResourceEntry};
use crate::source::ByteSource;
use crate::{decode_mac_roman, ForkError};

const HEADER_SIZE: usize = 16;
const TYPE_LIST_OFFSET_FIELD: u64 = 24;
const NAME_LIST_OFFSET_FIELD: u64 = 26;
const TYPE_ENTRY_SIZE: u64 = 8;
const REF_ENTRY_SIZE: u64 = 12;
const NO_NAME: u16 = 0xFFFF;

/// The four offsets/lengths at the start of every fork.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ForkHeader {
    pub data_offset: u32,
    pub map_offset: u32,
    pub data_length: u32,
    pub map_length: u32,
}

impl ForkHeader {
    fn from_bytes(b: &[u8; HEADER_SIZE]) -> Self {
        let word = |i: usize| u32::from_be_bytes([b[i], b[i + 1], b[i + 2], b[i + 3]]);
        Self {
            data_offset: word(0),
            map_offset: word(4),
            data_length: word(8),
            map_length: word(12),
        }
    }
}

// ---------------------------------------------------------------------------
// ResourceMap
// ---------------------------------------------------------------------------

/// All entries of one type, in on-disk order.
#[derive(Clone, Debug)]
pub struct TypeBucket {
    pub res_type: ResType,
    pub entries: Vec<ResourceEntry>,
    by_id: HashMap<i16, usize>,
}

impl TypeBucket {
    fn new(res_type: ResType) -> Self {
        Self { res_type, entries: Vec::new(), by_id: HashMap::new() }
    }

    fn insert(&mut self, entry: ResourceEntry) {
        match self.by_id.get(&entry.id) {
            Some(&idx) => self.entries[idx] = entry,
            None => {
                self.by_id.insert(entry.id, self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn get(&self, id: i16) -> Option<&ResourceEntry> {
        self.by_id.get(&id).map(|&idx| &self.entries[idx])
    }
}

/// Parsed resource map: type -> id -> entry.
#[derive(Clone, Debug, Default)]
pub struct ResourceMap {
    buckets: Vec<TypeBucket>,
    by_type: HashMap<ResType, usize>,
}

impl ResourceMap {
    /// Type codes in on-disk order.
    pub fn types(&self) -> impl Iterator<Item = ResType> + '_ {
        self.buckets.iter().map(|b| b.res_type)
    }

    pub fn of_type(&self, res_type: ResType) -> Option<&TypeBucket> {
        self.by_type.get(&res_type).map(|&idx| &self.buckets[idx])
    }

    pub fn get(&self, res_type: ResType, id: i16) -> Option<&ResourceEntry> {
        self.of_type(res_type)?.get(id)
    }

    /// Every entry, grouped by type in on-disk order.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceEntry> + '_ {
        self.buckets.iter().flat_map(|b| b.entries.iter())
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(|b| b.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// ResourceFork
// ---------------------------------------------------------------------------

/// A validated resource fork over a byte source.
///
/// The map is built at most once, by [`resource_map`](Self::resource_map);
/// afterwards the fork can be shared across threads for lookups.
#[derive(Debug)]
pub struct ResourceFork<S> {
    source: S,
    header: ForkHeader,
    map: OnceLock<ResourceMap>,
}

impl<S: ByteSource> ResourceFork<S> {
    /// Validate the header against its copy at the start of the map.
    pub fn open(source: S) -> Result<Self, ForkError> {
        let mut head = [0u8; HEADER_SIZE];
        source
            .read_exact_at(0, &mut head)
            .map_err(|_| ForkError::InvalidHeader { map_offset: 0 })?;
        let header = ForkHeader::from_bytes(&head);

        let mut copy = [0u8; HEADER_SIZE];
        source
            .read_exact_at(header.map_offset as u64, &mut copy)
            .map_err(|_| ForkError::InvalidHeader { map_offset: header.map_offset })?;
        if head != copy {
            return Err(ForkError::InvalidHeader { map_offset: header.map_offset });
        }

        tracing::debug!(
            data_offset = header.data_offset,
            map_offset = header.map_offset,
            data_length = header.data_length,
            map_length = header.map_length,
            "resource fork header"
        );
        Ok(Self { source, header, map: OnceLock::new() })
    }

    pub fn header(&self) -> &ForkHeader {
        &self.header
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Type codes in on-disk order, read straight from the type list.
    pub fn types(&self) -> Result<Vec<ResType>, ForkError> {
        if let Some(map) = self.map.get() {
            return Ok(map.types().collect());
        }
        let type_list = self.type_list()?;
        let count = type_count(&type_list)?;
        (0..count as u64)
            .map(|i| read_type_code(&type_list, i))
            .collect()
    }

    /// Materialize (once) and return the full resource map.
    pub fn resource_map(&self) -> Result<&ResourceMap, ForkError> {
        if let Some(map) = self.map.get() {
            return Ok(map);
        }
        let built = self.build_map()?;
        Ok(self.map.get_or_init(|| built))
    }

    pub fn get_resource(&self, res_type: ResType, id: i16) -> Result<Option<&ResourceEntry>, ForkError> {
        Ok(self.resource_map()?.get(res_type, id))
    }

    /// Copy an entry's payload out of the source.
    pub fn read_data(&self, entry: &ResourceEntry) -> Result<Vec<u8>, ForkError> {
        Ok(self.source.read_vec(entry.data_offset, entry.data_length as usize)?)
    }

    pub fn read(&self, entry: &ResourceEntry) -> Result<Resource, ForkError> {
        let data = self.read_data(entry)?;
        Ok(Resource { entry: entry.clone(), data })
    }

    fn type_list(&self) -> Result<crate::Window<'_, S>, ForkError> {
        let map_offset = self.header.map_offset as u64;
        let rel = self.source.read_u16_be(map_offset + TYPE_LIST_OFFSET_FIELD)?;
        Ok(self.source.window(map_offset + rel as u64))
    }

    fn build_map(&self) -> Result<ResourceMap, ForkError> {
        let map_offset = self.header.map_offset as u64;
        let name_rel = self.source.read_u16_be(map_offset + NAME_LIST_OFFSET_FIELD)?;
        let type_list = self.type_list()?;
        let name_list = self.source.window(map_offset + name_rel as u64);
        let data = self.source.window(self.header.data_offset as u64);

        let count = type_count(&type_list)?;
        tracing::debug!(types = count, "reading resource map");

        let mut map = ResourceMap::default();
        for i in 0..count as u64 {
            let res_type = read_type_code(&type_list, i)?;
            if map.by_type.contains_key(&res_type) {
                return Err(ForkError::DuplicateResourceType(res_type));
            }

            let entry_base = 2 + i * TYPE_ENTRY_SIZE;
            let res_count = type_list.read_u16_be(entry_base + 4)? as u32 + 1;
            let ref_list = type_list.read_u16_be(entry_base + 6)? as u64;

            let mut bucket = TypeBucket::new(res_type);
            for j in 0..res_count as u64 {
                let r = ref_list + j * REF_ENTRY_SIZE;
                let id = type_list.read_u16_be(r)? as i16;
                let name_offset = type_list.read_u16_be(r + 2)?;
                let data_hi = type_list.read_u8(r + 5)? as u64;
                let data_lo = type_list.read_u16_be(r + 6)? as u64;
                let packed = (data_hi << 16) | data_lo;

                let name = if name_offset == NO_NAME {
                    None
                } else {
                    let len = name_list.read_u8(name_offset as u64)?;
                    let bytes = name_list.read_vec(name_offset as u64 + 1, len as usize)?;
                    Some(decode_mac_roman(&bytes))
                };

                let data_length = data.read_u32_be(packed)?;
                let available = data.len().saturating_sub(packed + 4);
                if (data_length as u64) > available {
                    return Err(ForkError::TruncatedResource {
                        res_type,
                        id,
                        declared: data_length,
                        available,
                    });
                }

                let entry = ResourceEntry {
                    res_type,
                    id,
                    name,
                    data_offset: data.start() + packed + 4,
                    data_length,
                };
                tracing::trace!(%res_type, id, name = entry.display_name(), len = data_length, "resource");
                bucket.insert(entry);
            }

            map.by_type.insert(res_type, map.buckets.len());
            map.buckets.push(bucket);
        }
        Ok(map)
    }
}

/// Stored as (count - 1); a stored 0xFFFF wraps to zero types.
fn type_count<S: ByteSource>(type_list: &S) -> Result<u16, ForkError> {
    Ok(type_list.read_u16_be(0)?.wrapping_add(1))
}

fn read_type_code<S: ByteSource>(type_list: &S, index: u64) -> Result<ResType, ForkError> {
    let mut code = [0u8; 4];
    type_list.read_exact_at(2 + index * TYPE_ENTRY_SIZE, &mut code)?;
    Ok(ResType(code))
}
