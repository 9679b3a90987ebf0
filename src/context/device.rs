//! cpal output device backend.

use cpal::traits::{DeviceTrait, HostTrait};

use crate::{context::renderer::Renderer, error::AudioError};

/// Find the requested output device (or the host default) and its preferred
/// stream configuration. Only f32 output is supported.
pub(crate) fn open(
    name: Option<&str>,
) -> Result<(cpal::Device, cpal::SupportedStreamConfig), AudioError> {
    let host = cpal::default_host();
    let device = match name {
        Some(name) => host
            .output_devices()?
            .find(|device| device.name().is_ok_and(|n| n == name))
            .ok_or_else(|| AudioError::DeviceNotFound(name.to_string()))?,
        None => host.default_output_device().ok_or(AudioError::NoDevice)?,
    };

    let config = device.default_output_config()?;
    if config.sample_format() != cpal::SampleFormat::F32 {
        return Err(AudioError::UnsupportedFormat(config.sample_format()));
    }

    Ok((device, config))
}

/// Build the output stream, moving the renderer into its callback.
pub(crate) fn build_stream(
    device: &cpal::Device,
    config: &cpal::SupportedStreamConfig,
    mut renderer: Renderer,
) -> Result<cpal::Stream, AudioError> {
    let channels = config.channels() as usize;

    let stream = device.build_output_stream(
        &config.config(),
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            renderer.render_interleaved(data, channels);
        },
        |err| tracing::error!(%err, "audio stream error"),
        None,
    )?;

    Ok(stream)
}

/// Names of the output devices the default host can see.
pub fn output_device_names() -> Result<Vec<String>, AudioError> {
    let host = cpal::default_host();
    Ok(host
        .output_devices()?
        .filter_map(|device| device.name().ok())
        .collect())
}
