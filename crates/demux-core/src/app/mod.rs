//! App - アプリケーション層
//!
//! typed の部品と ports を組み合わせて demux を組み立てます。
//!
//! # 主要コンポーネント
//! - **DemuxConfig**: probe / handler / tracer の登録と構築時検証
//! - **Demux**: identify → lookup → decode → invoke
//! - **DemuxEntry**: ホストに渡すエントリポイント（構築失敗も呼び出し時に返す）

pub mod builder;
pub mod demux;
pub mod entry;

pub use self::builder::DemuxConfig;
pub use self::demux::Demux;
pub use self::entry::{DemuxEntry, new_demux_handler};
