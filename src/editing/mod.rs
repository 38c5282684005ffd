// Editing - Copy and paste of blocks and notes

pub mod clipboard;

pub use clipboard::{Clipboard, ClipboardItem, Pastable};
