/*!
 * Device Address Codec
 * BlueZ object paths <-> canonical `AA:BB:CC:DD:EE:FF` addresses
 */

use dbus::Path;

use crate::error::{Error, Result};
use crate::ObjectPath;

const DEVICE_MARKER: &str = "dev_";
const OCTETS: usize = 6;

/// Convert `/org/bluez/hci0/dev_AA_BB_CC_DD_EE_FF` to `AA:BB:CC:DD:EE:FF`.
///
/// The suffix after the first `dev_` marker (up to the next `/`) must be six
/// hexadecimal octets separated by underscores.
pub fn derive_address(path: &str) -> Result<String> {
    let start = path
        .find(DEVICE_MARKER)
        .ok_or_else(|| Error::MalformedIdentifier(path.to_string()))?;
    let suffix = &path[start + DEVICE_MARKER.len()..];
    let suffix = suffix.split('/').next().unwrap_or_default();

    if !is_octet_list(suffix, '_') {
        return Err(Error::MalformedIdentifier(path.to_string()));
    }

    Ok(suffix.replace('_', ":"))
}

/// Convert `AA:BB:CC:DD:EE:FF` to `<adapter>/dev_AA_BB_CC_DD_EE_FF`.
pub fn device_path(adapter: &str, address: &str) -> Result<ObjectPath> {
    let address = address.trim();
    if !is_octet_list(address, ':') {
        return Err(Error::MalformedAddress(address.to_string()));
    }

    let mangled = address.to_ascii_uppercase().replace(':', "_");
    let adapter = adapter.trim_end_matches('/');
    Path::new(format!("{adapter}/{DEVICE_MARKER}{mangled}")).map_err(|reason| Error::InvalidName {
        name: adapter.to_string(),
        reason,
    })
}

fn is_octet_list(s: &str, separator: char) -> bool {
    let mut count = 0;
    for octet in s.split(separator) {
        if octet.len() != 2 || !octet.chars().all(|c| c.is_ascii_hexdigit()) {
            return false;
        }
        count += 1;
    }
    count == OCTETS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_address_from_device_path() {
        assert_eq!(
            derive_address("/org/bluez/hci0/dev_98_4F_EE_0F_42_B4").unwrap(),
            "98:4F:EE:0F:42:B4"
        );
        assert_eq!(
            derive_address("/org/bluez/hci1/dev_aa_bb_cc_dd_ee_ff").unwrap(),
            "aa:bb:cc:dd:ee:ff"
        );
    }

    #[test]
    fn child_objects_resolve_to_their_device() {
        assert_eq!(
            derive_address("/org/bluez/hci0/dev_00_1A_7D_DA_71_13/service000a").unwrap(),
            "00:1A:7D:DA:71:13"
        );
    }

    #[test]
    fn missing_marker_is_malformed() {
        for path in ["/", "/org/bluez", "/org/bluez/hci0"] {
            match derive_address(path) {
                Err(Error::MalformedIdentifier(p)) => assert_eq!(p, path),
                other => panic!("expected MalformedIdentifier for {path}, got {other:?}"),
            }
        }
    }

    #[test]
    fn bad_suffix_is_malformed() {
        for path in [
            "/org/bluez/hci0/dev_",
            "/org/bluez/hci0/dev_98_4F_EE_0F_42",
            "/org/bluez/hci0/dev_98_4F_EE_0F_42_B4_00",
            "/org/bluez/hci0/dev_98_4F_EE_0F_42_XY",
        ] {
            assert!(matches!(derive_address(path), Err(Error::MalformedIdentifier(_))), "{path}");
        }
    }

    #[test]
    fn builds_device_path_from_address() {
        let path = device_path("/org/bluez/hci0", "98:4f:ee:0f:42:b4").unwrap();
        assert_eq!(&*path, "/org/bluez/hci0/dev_98_4F_EE_0F_42_B4");
        assert_eq!(derive_address(&path).unwrap(), "98:4F:EE:0F:42:B4");
    }

    #[test]
    fn rejects_non_addresses() {
        for input in ["", "headset", "98-4F-EE-0F-42-B4", "98:4F:EE:0F:42"] {
            assert!(matches!(
                device_path("/org/bluez/hci0", input),
                Err(Error::MalformedAddress(_))
            ));
        }
    }
}
