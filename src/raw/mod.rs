mod arena;
mod bulk;
mod handle;
mod node;
mod raw_tree_map;

pub(crate) use handle::Handle;
pub(crate) use raw_tree_map::RawTreeMap;
