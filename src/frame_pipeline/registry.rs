//! Decoder registry
//!
//! Maps a [`PixelFormatCode`] to the plugin that builds decoders for it. The
//! registry is append-only: plugins are added at start-up or when a decoder
//! plugin is loaded, never removed, and a second plugin for an already
//! registered code is rejected with `AlreadyRegistered` (the first one stays).
//! Lookups take a read lock only long enough to clone the plugin handle.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::frame_pipeline::common::error::{DecodeError, Result};
use crate::frame_pipeline::debayer::DemosaicBackend;
use crate::frame_pipeline::decoder::{BayerPlugin, Decoder, FnPlugin, PixelFormatPlugin};
use crate::frame_pipeline::format::PixelFormatCode;

#[derive(Default)]
pub struct DecoderRegistry {
    plugins: RwLock<HashMap<PixelFormatCode, Arc<dyn PixelFormatPlugin>>>,
}

impl DecoderRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the Bayer family with the default demosaic backend.
    pub fn with_builtin_decoders() -> Self {
        Self::with_bayer_family(DemosaicBackend::default())
    }

    pub fn with_bayer_family(backend: DemosaicBackend) -> Self {
        let registry = Self::new();
        {
            let mut plugins = registry.plugins.write();
            for plugin in BayerPlugin::family(backend) {
                plugins.insert(plugin.pixel_format(), Arc::new(plugin));
            }
        }
        info!(
            "Decoder registry initialized with {} Bayer formats ({:?})",
            registry.len(),
            backend
        );
        registry
    }

    pub fn register(&self, plugin: Arc<dyn PixelFormatPlugin>) -> Result<()> {
        let code = plugin.pixel_format();
        let mut plugins = self.plugins.write();
        if let Some(existing) = plugins.get(&code) {
            return Err(DecodeError::AlreadyRegistered {
                format: code,
                plugin_id: existing.plugin_id().to_string(),
            });
        }
        debug!("Registered decoder plugin {} for {}", plugin.plugin_id(), code);
        plugins.insert(code, plugin);
        Ok(())
    }

    /// Registers a closure as the factory for `code`.
    pub fn register_factory<F>(
        &self,
        code: PixelFormatCode,
        plugin_id: impl Into<String>,
        factory: F,
    ) -> Result<()>
    where
        F: Fn(u32, u32) -> Result<Box<dyn Decoder>> + Send + Sync + 'static,
    {
        self.register(Arc::new(FnPlugin::new(code, plugin_id, factory)))
    }

    /// Builds a decoder for `code` at the given geometry.
    pub fn lookup(&self, code: PixelFormatCode, width: u32, height: u32) -> Result<Box<dyn Decoder>> {
        let plugin = self
            .plugins
            .read()
            .get(&code)
            .cloned()
            .ok_or(DecodeError::UnsupportedFormat(code))?;
        plugin.make_decoder(width, height)
    }

    pub fn contains(&self, code: PixelFormatCode) -> bool {
        self.plugins.read().contains_key(&code)
    }

    pub fn plugin_id(&self, code: PixelFormatCode) -> Option<String> {
        self.plugins
            .read()
            .get(&code)
            .map(|p| p.plugin_id().to_string())
    }

    /// Registered codes in ascending order.
    pub fn formats(&self) -> Vec<PixelFormatCode> {
        let mut codes: Vec<_> = self.plugins.read().keys().copied().collect();
        codes.sort();
        codes
    }

    pub fn len(&self) -> usize {
        self.plugins.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_pipeline::debayer::Image;
    use crate::frame_pipeline::format::{BAYER_FAMILY, descriptor_for};
    use crate::frame_pipeline::raw::RawFrameView;
    use crate::frame_pipeline::synthetic::mid_grey;
    use std::thread;

    const MONO_8: PixelFormatCode = PixelFormatCode(0x0108_0001);

    /// Passes 8-bit samples through as a grey image.
    struct MonoDecoder {
        width: u32,
        height: u32,
    }

    impl Decoder for MonoDecoder {
        fn pixel_format(&self) -> PixelFormatCode {
            MONO_8
        }

        fn geometry(&self) -> (u32, u32) {
            (self.width, self.height)
        }

        fn expected_frame_len(&self) -> usize {
            (self.width * self.height) as usize
        }

        fn decode(&mut self, raw: &RawFrameView<'_>) -> Result<Image> {
            if raw.len() != self.expected_frame_len() {
                return Err(DecodeError::SizeMismatch {
                    format: MONO_8,
                    expected: self.expected_frame_len(),
                    actual: raw.len(),
                });
            }
            Ok(Image {
                width: self.width as usize,
                height: self.height as usize,
                data: raw.bytes().iter().flat_map(|&b| [b as u16; 3]).collect(),
                bits_per_sample: 8,
            })
        }
    }

    fn mono_factory(width: u32, height: u32) -> Result<Box<dyn Decoder>> {
        crate::frame_pipeline::common::validate_geometry(width, height)?;
        Ok(Box::new(MonoDecoder { width, height }))
    }

    #[test]
    fn builtin_registry_covers_the_bayer_family() {
        let registry = DecoderRegistry::with_builtin_decoders();
        assert_eq!(registry.len(), BAYER_FAMILY.len());
        for descriptor in BAYER_FAMILY {
            assert!(registry.contains(descriptor.code));
            assert_eq!(registry.plugin_id(descriptor.code).as_deref(), Some(descriptor.plugin_id));
        }
        let formats = registry.formats();
        assert!(formats.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn lookup_then_decode_for_all_registered_formats() {
        let registry = DecoderRegistry::with_builtin_decoders();
        for code in registry.formats() {
            let descriptor = descriptor_for(code).unwrap();
            let raw = mid_grey(descriptor, 8, 4);
            let mut decoder = registry.lookup(code, 8, 4).unwrap();
            let image = decoder.decode(&RawFrameView::new(&raw, 8, 4)).unwrap();
            assert_eq!((image.width, image.height, image.channels()), (8, 4, 3));
        }
    }

    #[test]
    fn unregistered_code_is_unsupported() {
        let registry = DecoderRegistry::with_builtin_decoders();
        match registry.lookup(MONO_8, 4, 4) {
            Err(DecodeError::UnsupportedFormat(code)) => assert_eq!(code, MONO_8),
            other => panic!("expected UnsupportedFormat, got {:?}", other.map(|d| d.pixel_format())),
        }
    }

    #[test]
    fn runtime_registration_is_accepted() {
        let registry = DecoderRegistry::with_builtin_decoders();
        registry
            .register_factory(MONO_8, "org.example.codec.Mono8", mono_factory)
            .unwrap();

        let mut decoder = registry.lookup(MONO_8, 2, 1).unwrap();
        let image = decoder.decode(&RawFrameView::new(&[7, 9], 2, 1)).unwrap();
        assert_eq!(image.pixel(1, 0), Some([9, 9, 9]));
        assert_eq!(registry.plugin_id(MONO_8).as_deref(), Some("org.example.codec.Mono8"));
    }

    #[test]
    fn duplicate_registration_keeps_the_first_plugin() {
        let registry = DecoderRegistry::with_builtin_decoders();
        let result = registry.register_factory(PixelFormatCode::BAYER_BG_10, "org.example.Other", mono_factory);

        match result {
            Err(DecodeError::AlreadyRegistered { format, plugin_id }) => {
                assert_eq!(format, PixelFormatCode::BAYER_BG_10);
                assert_eq!(plugin_id, "rs.arvdecode.BayerBG10");
            }
            other => panic!("expected AlreadyRegistered, got {:?}", other),
        }
        assert_eq!(
            registry.plugin_id(PixelFormatCode::BAYER_BG_10).as_deref(),
            Some("rs.arvdecode.BayerBG10")
        );
    }

    #[test]
    fn lookup_propagates_invalid_geometry() {
        let registry = DecoderRegistry::with_builtin_decoders();
        assert!(matches!(
            registry.lookup(PixelFormatCode::BAYER_RG_12, 0, 480),
            Err(DecodeError::InvalidGeometry { width: 0, height: 480 })
        ));
    }

    #[test]
    fn concurrent_lookups_each_get_their_own_decoder() {
        let registry = Arc::new(DecoderRegistry::with_builtin_decoders());
        let handles: Vec<_> = (0..4u32)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    let (w, h) = (4 + 2 * i, 4);
                    let descriptor = descriptor_for(PixelFormatCode::BAYER_GB_16).unwrap();
                    let raw = mid_grey(descriptor, w, h);
                    let mut decoder = registry.lookup(descriptor.code, w, h).unwrap();
                    for _ in 0..10 {
                        let image = decoder.decode(&RawFrameView::new(&raw, w, h)).unwrap();
                        assert_eq!(image.width, w as usize);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
