mod app_helper;

mod authors_command;
pub(crate) use authors_command::AuthorsCommand;

mod check_command;
pub(crate) use check_command::CheckCommand;

mod cli_manager;

mod command;

pub(crate) mod common;

mod cover_command;
pub(crate) use cover_command::CoverCommand;

mod encode_graph_command;
pub(crate) use encode_graph_command::EncodeGraphCommand;
