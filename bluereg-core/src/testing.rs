//! In-memory transport serving canned BlueZ replies.

use dbus::arg::{IterAppend, Variant};
use dbus::{Message, Path, Signature};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::time::Duration;

use crate::bus::Transport;

type Key = (String, String, String);

enum Reply {
    Ok(Box<dyn Fn() -> Message>),
    Err { name: String, message: String },
}

pub(crate) struct MockTransport {
    open: Cell<bool>,
    replies: RefCell<HashMap<Key, Reply>>,
    calls: RefCell<Vec<String>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self {
            open: Cell::new(true),
            replies: RefCell::new(HashMap::new()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn disconnect(&self) {
        self.open.set(false);
    }

    pub(crate) fn reply<F>(&self, object: &str, interface: &str, member: &str, f: F)
    where
        F: Fn() -> Message + 'static,
    {
        self.replies
            .borrow_mut()
            .insert(key(object, interface, member), Reply::Ok(Box::new(f)));
    }

    pub(crate) fn ok(&self, object: &str, interface: &str, member: &str) {
        self.reply(object, interface, member, carrier);
    }

    pub(crate) fn fail(&self, object: &str, interface: &str, member: &str, name: &str, message: &str) {
        self.replies.borrow_mut().insert(
            key(object, interface, member),
            Reply::Err {
                name: name.to_string(),
                message: message.to_string(),
            },
        );
    }

    /// Serve `GetManagedObjects` on `/`.
    pub(crate) fn objects(&self, entries: &[(&str, &[&str])]) {
        let owned: Vec<(String, Vec<String>)> = entries
            .iter()
            .map(|(p, ifaces)| (p.to_string(), ifaces.iter().map(|i| i.to_string()).collect()))
            .collect();
        self.reply("/", "org.freedesktop.DBus.ObjectManager", "GetManagedObjects", move || {
            managed_objects(&owned)
        });
    }

    pub(crate) fn introspect(&self, object: &str, interfaces: &[&str]) {
        let xml = introspection(interfaces);
        self.reply(object, "org.freedesktop.DBus.Introspectable", "Introspect", move || {
            carrier().append1(xml.as_str())
        });
    }

    pub(crate) fn property(&self, object: &str, property: &str, value: &str) {
        let value = value.to_string();
        self.reply(object, PROPERTIES, &format!("Get({property})"), move || {
            carrier().append1(Variant(value.clone()))
        });
    }

    pub(crate) fn property_fails(&self, object: &str, property: &str) {
        self.fail(
            object,
            PROPERTIES,
            &format!("Get({property})"),
            "org.freedesktop.DBus.Error.InvalidArgs",
            "No such property",
        );
    }

    /// `"<object> <interface>.<member>"` for every call, in order.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl Transport for MockTransport {
    fn is_open(&self) -> bool {
        self.open.get()
    }

    fn send_blocking(&self, request: Message, _timeout: Duration) -> Result<Message, dbus::Error> {
        let object = request.path().map(|p| p.to_string()).unwrap_or_default();
        let interface = request.interface().map(|i| i.to_string()).unwrap_or_default();
        let mut member = request.member().map(|m| m.to_string()).unwrap_or_default();
        if interface == PROPERTIES && member == "Get" {
            if let Ok((_, property)) = request.read2::<&str, &str>() {
                member = format!("Get({property})");
            }
        }

        self.calls
            .borrow_mut()
            .push(format!("{object} {interface}.{member}"));

        match self.replies.borrow().get(&key(&object, &interface, &member)) {
            Some(Reply::Ok(f)) => Ok(f()),
            Some(Reply::Err { name, message }) => Err(dbus::Error::new_custom(name, message)),
            None => Err(dbus::Error::new_custom(
                "org.freedesktop.DBus.Error.UnknownObject",
                &format!("No reply for {object} {interface}.{member}"),
            )),
        }
    }
}

const PROPERTIES: &str = "org.freedesktop.DBus.Properties";

fn key(object: &str, interface: &str, member: &str) -> Key {
    (object.to_string(), interface.to_string(), member.to_string())
}

pub(crate) fn path(s: &str) -> Path<'static> {
    Path::new(s.to_string()).unwrap()
}

fn sig(s: &str) -> Signature<'static> {
    Signature::new(s.to_string()).unwrap()
}

/// Empty message used as a reply body carrier.
pub(crate) fn carrier() -> Message {
    Message::new_method_call("org.bluez", "/", "org.bluez.Test", "Reply").unwrap()
}

/// An `a{oa{sa{sv}}}` body. Each object's interface payload grows with the
/// interface's position so entries differ in size.
pub(crate) fn managed_objects<P: AsRef<str>, I: AsRef<str>>(entries: &[(P, Vec<I>)]) -> Message {
    let mut msg = carrier();
    {
        let mut args = IterAppend::new(&mut msg);
        args.append_dict(&sig("o"), &sig("a{sa{sv}}"), |objects| {
            for (object, interfaces) in entries {
                objects.append_dict_entry(|entry| {
                    entry.append(path(object.as_ref()));
                    entry.append_dict(&sig("s"), &sig("a{sv}"), |ifaces| {
                        for (n, iface) in interfaces.iter().enumerate() {
                            ifaces.append_dict_entry(|ie| {
                                ie.append(iface.as_ref());
                                ie.append_dict(&sig("s"), &sig("v"), |props| {
                                    for i in 0..=n {
                                        props.append_dict_entry(|pe| {
                                            pe.append(format!("Prop{i}"));
                                            pe.append(Variant(i as u32));
                                        });
                                    }
                                    props.append_dict_entry(|pe| {
                                        pe.append("UUIDs");
                                        pe.append(Variant(vec![
                                            "0000110b-0000-1000-8000-00805f9b34fb".to_string(),
                                            "0000111e-0000-1000-8000-00805f9b34fb".to_string(),
                                        ]));
                                    });
                                });
                            });
                        }
                    });
                });
            }
        });
    }
    msg
}

pub(crate) fn introspection(interfaces: &[&str]) -> String {
    let mut xml = String::from(
        "<!DOCTYPE node PUBLIC \"-//freedesktop//DTD D-BUS Object Introspection 1.0//EN\"\n\
         \"http://www.freedesktop.org/standards/dbus/1.0/introspect.dtd\">\n<node>\n",
    );
    for iface in interfaces {
        xml.push_str(&format!("  <interface name=\"{iface}\">\n  </interface>\n"));
    }
    xml.push_str("</node>\n");
    xml
}
