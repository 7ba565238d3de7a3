pub mod api;
pub mod relay;

use crate::cli::Args;
use crate::server::relay::RelayService;
use std::error::Error;

pub struct Server {
    relay: RelayService,
    args: Args,
}

impl Server {
    pub fn new(relay: RelayService, args: Args) -> Self {
        Self { relay, args }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        api::start_http_server(self.relay.clone(), self.args.clone()).await
    }
}
