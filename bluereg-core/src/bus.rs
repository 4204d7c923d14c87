/*!
 * Bus Session
 * One blocking connection to the system bus, shared by every component
 */

use dbus::blocking::{BlockingSender, Connection};
use dbus::strings::{BusName, Interface, Member};
use dbus::{Message, Path};
use std::time::Duration;
use tracing::debug;

use crate::config::BluezConfig;
use crate::error::{Error, RemoteError, Result};

/// Something that can carry one method call to the bus and block for its reply.
pub trait Transport {
    fn is_open(&self) -> bool;
    fn send_blocking(&self, request: Message, timeout: Duration) -> std::result::Result<Message, dbus::Error>;
}

impl Transport for Connection {
    fn is_open(&self) -> bool {
        self.channel().is_connected()
    }

    fn send_blocking(&self, request: Message, timeout: Duration) -> std::result::Result<Message, dbus::Error> {
        BlockingSender::send_with_reply_and_block(self, request, timeout)
    }
}

pub struct BusSession<T = Connection> {
    transport: Option<T>,
    service: BusName<'static>,
    timeout: Duration,
}

impl BusSession<Connection> {
    /// Connect to the system bus.
    pub fn open_system(config: &BluezConfig) -> Result<Self> {
        let conn = Connection::new_system().map_err(|e| Error::Connect(e.into()))?;
        debug!("Connected to system bus");
        Self::with_transport(conn, config)
    }
}

impl<T: Transport> BusSession<T> {
    pub fn with_transport(transport: T, config: &BluezConfig) -> Result<Self> {
        let service = BusName::new(config.service.clone()).map_err(|reason| Error::InvalidName {
            name: config.service.clone(),
            reason,
        })?;

        Ok(Self {
            transport: Some(transport),
            service,
            timeout: config.call_timeout(),
        })
    }

    pub fn is_open(&self) -> bool {
        self.transport.as_ref().map_or(false, |t| t.is_open())
    }

    /// Drop the connection. Later calls fail with `BusUnavailable`.
    pub fn close(&mut self) {
        if self.transport.take().is_some() {
            debug!("Closed bus session");
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn transport(&self) -> Option<&T> {
        self.transport.as_ref()
    }

    /// Issue `interface.method` on `object` and block for the reply.
    ///
    /// `append` adds the call arguments to the request message.
    pub fn call<F>(&self, object: &Path<'_>, interface: &str, method: &str, append: F) -> Result<Message>
    where
        F: FnOnce(Message) -> Message,
    {
        self.call_with_timeout(object, interface, method, self.timeout, append)
    }

    pub fn call_with_timeout<F>(
        &self,
        object: &Path<'_>,
        interface: &str,
        method: &str,
        timeout: Duration,
        append: F,
    ) -> Result<Message>
    where
        F: FnOnce(Message) -> Message,
    {
        let transport = match &self.transport {
            Some(t) if t.is_open() => t,
            _ => return Err(Error::BusUnavailable),
        };

        let iface = Interface::new(interface).map_err(|reason| Error::InvalidName {
            name: interface.to_string(),
            reason,
        })?;
        let member = Member::new(method).map_err(|reason| Error::InvalidName {
            name: method.to_string(),
            reason,
        })?;

        debug!("Calling {}.{} on {}", interface, method, object);
        let request = append(Message::method_call(&self.service, object, &iface, &member));

        transport
            .send_blocking(request, timeout)
            .map_err(|e| Error::RemoteCallFailed {
                service: self.service.to_string(),
                object: object.to_string(),
                interface: interface.to_string(),
                method: method.to_string(),
                cause: RemoteError::from(e),
            })
    }
}
