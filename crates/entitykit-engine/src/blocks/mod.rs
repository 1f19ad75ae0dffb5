//! Block helper queries and block list editing, built on the streaming
//! tokenizer from `entitykit-syntax`.

pub mod edit;
pub mod outline;
pub mod query;
pub mod sync;
pub mod transfer;

pub use edit::{
    BlockUpdate, ClonePosition, EditError, KEEP_CONTENT, MoveOutcome, Position, RemoveTarget,
    clone_block, create_block, insert_block, move_block, remove_blocks, replace_blocks,
    update_block,
};
pub use outline::{BlockOutline, strip_inner_html};
pub use query::{
    BlockCounts, BlockListRow, BlockSpan, block_level, count_by_type, extract_matching,
    filter_empty_blocks, get_at_index, get_block_count, get_block_span, get_block_types,
    has_block, has_blocks, list_blocks, parse_all, parse_blocks,
};
pub use sync::{sync_heading_level, sync_html, sync_list_type};
pub use transfer::{
    BlockExport, ExportedBlocks, GENERATOR, ImportError, blocks_from_value, export_blocks,
    import_blocks,
};
