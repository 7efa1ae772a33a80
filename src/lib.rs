pub mod core;
pub mod llm;
pub mod rag;
pub mod server;
pub mod state;
pub mod survey;

#[cfg(test)]
pub(crate) mod test_support;
