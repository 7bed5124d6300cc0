// Purpose - external interfaces: asset files in, note events in

pub mod assets;
pub mod events;
pub mod loader;

pub use assets::AssetDecl;
pub use events::NoteEvent;
pub use loader::LoadError;
