use crate::libs::{messages::Message, registry::SchemaRegistry, view::View};
use crate::msg_print;
use anyhow::Result;

pub fn cmd() -> Result<()> {
    msg_print!(Message::SchemasHeader, true);
    View::schemas(&SchemaRegistry::with_defaults())
}
