use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::smtp::Security;

/// One connect, authenticate, submit cycle.
///
/// Implementations must release the connection before returning, whatever
/// the outcome.
#[async_trait]
pub trait Submit: Send + Sync {
    async fn submit(&self, security: Security, message: &Message) -> Result<(), String>;
}

pub struct SmtpSubmitter {
    server: String,
    port: u16,
    credentials: Credentials,
}

impl SmtpSubmitter {
    pub fn new(config: &SmtpConfig) -> Self {
        Self {
            server: config.server.clone(),
            port: config.port,
            credentials: Credentials::new(config.username.clone(), config.password.clone()),
        }
    }

    // Certificate and hostname checks are off so legacy and self-signed
    // relays are reachable. This trades away server authentication; do not
    // point it at a relay you do not control the network path to. rustls has
    // no legacy cipher suites, so servers that only speak those are out of reach.
    fn tls_parameters(&self) -> Result<TlsParameters, String> {
        TlsParameters::builder(self.server.clone())
            .dangerous_accept_invalid_certs(true)
            .build()
            .map_err(|e| e.to_string())
    }

    fn transport(
        &self,
        security: Security,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, String> {
        let params = self.tls_parameters()?;
        let tls = match security {
            Security::ImplicitTls => Tls::Wrapper(params),
            Security::StartTls => Tls::Required(params),
        };

        // Built without the pool feature, so `send` opens a fresh connection
        // and closes it again on success and on every error path.
        Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.server)
            .port(self.port)
            .tls(tls)
            .credentials(self.credentials.clone())
            .build())
    }
}

#[async_trait]
impl Submit for SmtpSubmitter {
    async fn submit(&self, security: Security, message: &Message) -> Result<(), String> {
        let transport = self.transport(security)?;
        transport
            .send(message.clone())
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}
