// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::collections::HashMap;

use parking_lot::RwLock;

use super::directory::{ChannelDirectory, ChannelInfo};
use crate::core::channel::base_name;
use crate::core::{FrameLinkError, Result};

/// Process-local channel directory.
///
/// Lookups take the read lock so many receivers can poll concurrently.
#[derive(Default)]
pub struct InMemoryDirectory {
    channels: RwLock<HashMap<String, ChannelInfo>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.channels.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.read().is_empty()
    }
}

impl ChannelDirectory for InMemoryDirectory {
    fn publish(&self, name: &str, info: ChannelInfo) -> Result<()> {
        let key = base_name(name);
        if key.is_empty() {
            return Err(FrameLinkError::Publish("channel name is empty".into()));
        }

        let mut channels = self.channels.write();
        if channels.contains_key(key) {
            return Err(FrameLinkError::Publish(format!(
                "channel '{}' is already published",
                key
            )));
        }
        channels.insert(key.to_string(), info);
        Ok(())
    }

    fn update(&self, name: &str, info: ChannelInfo) -> Result<()> {
        let key = base_name(name);
        match self.channels.write().get_mut(key) {
            Some(entry) => {
                *entry = info;
                Ok(())
            }
            None => Err(FrameLinkError::NotFound(format!(
                "channel '{}' is not published",
                key
            ))),
        }
    }

    fn find(&self, name: &str) -> Option<ChannelInfo> {
        self.channels.read().get(base_name(name)).copied()
    }

    fn retract(&self, name: &str) {
        self.channels.write().remove(base_name(name));
    }

    fn channel_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.channels.read().keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::discovery::ChannelPublication;
    use crate::core::rhi::{SharedHandle, SharedPixelFormat};

    fn info(width: u32, height: u32) -> ChannelInfo {
        ChannelInfo::new(
            width,
            height,
            SharedHandle::from_raw(7),
            SharedPixelFormat::Bgra8Unorm,
        )
    }

    #[test]
    fn test_publish_and_find_by_base_name() {
        let dir = InMemoryDirectory::new();
        dir.publish("Cam|FPS=30", info(64, 64)).unwrap();

        assert_eq!(dir.find("Cam"), Some(info(64, 64)));
        assert_eq!(dir.find("Cam|FPS=60/1"), Some(info(64, 64)));
        assert_eq!(dir.channel_names(), vec!["Cam".to_string()]);
    }

    #[test]
    fn test_name_collision_is_publish_error() {
        let dir = InMemoryDirectory::new();
        dir.publish("Cam", info(64, 64)).unwrap();

        let err = dir.publish("Cam", info(32, 32)).unwrap_err();
        assert!(matches!(err, FrameLinkError::Publish(_)));
    }

    #[test]
    fn test_update_requires_publication() {
        let dir = InMemoryDirectory::new();
        assert!(dir.update("Cam", info(1, 1)).is_err());

        dir.publish("Cam", info(64, 64)).unwrap();
        dir.update("Cam", info(128, 64)).unwrap();
        assert_eq!(dir.find("Cam").map(|i| i.width), Some(128));
    }

    #[test]
    fn test_publication_retracts_on_drop() {
        let dir = Arc::new(InMemoryDirectory::new());
        {
            let _publication = ChannelPublication::publish(dir.clone(), "Cam", info(8, 8)).unwrap();
            assert!(dir.find("Cam").is_some());
        }
        assert!(dir.find("Cam").is_none());

        // Name is free again.
        dir.publish("Cam", info(8, 8)).unwrap();
    }

    #[test]
    fn test_unknown_format_code_survives_discovery() {
        let dir = InMemoryDirectory::new();
        let mut odd = info(8, 8);
        odd.format_code = 28;
        dir.publish("Odd", odd).unwrap();

        assert!(dir.find("Odd").unwrap().format().is_err());
    }
}
