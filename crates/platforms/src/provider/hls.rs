use m3u8_rs::{MasterPlaylist, Playlist, VariantStream};
use tracing::debug;
use url::Url;

use super::error::ProviderError;
use crate::media::Rendition;

/// Decodes an HLS manifest into the channel's rendition set.
///
/// Variant order is preserved as the manifest lists it. A media playlist
/// (no variants) is exposed as a single `source` rendition pointing at the
/// manifest itself.
pub fn renditions_from_playlist(
    body: &[u8],
    manifest_url: &str,
) -> Result<Vec<Rendition>, ProviderError> {
    let base_url =
        Url::parse(manifest_url).map_err(|e| ProviderError::InvalidUrl(e.to_string()))?;

    let playlist = m3u8_rs::parse_playlist_res(body)
        .map_err(|e| ProviderError::HlsPlaylistError(e.to_string()))?;

    let renditions = match playlist {
        Playlist::MasterPlaylist(pl) => process_master_playlist(pl, &base_url)?,
        Playlist::MediaPlaylist(_) => vec![Rendition::new("source", manifest_url)],
    };

    debug!("Found {} stream variants", renditions.len());
    Ok(renditions)
}

fn process_master_playlist(
    playlist: MasterPlaylist,
    base_url: &Url,
) -> Result<Vec<Rendition>, ProviderError> {
    playlist
        .variants
        .into_iter()
        .filter(|variant| !variant.is_i_frame)
        .map(|variant| {
            let uri = base_url
                .join(&variant.uri)
                .map_err(|e| ProviderError::InvalidUrl(format!("{}: {e}", variant.uri)))?;
            Ok(Rendition {
                quality: quality_label(&variant),
                uri: uri.to_string(),
                bandwidth: variant.bandwidth,
                resolution: variant
                    .resolution
                    .map(|r| format!("{}x{}", r.width, r.height)),
            })
        })
        .collect()
}

fn quality_label(variant: &VariantStream) -> String {
    if let Some(video) = variant.video.as_deref().filter(|v| !v.is_empty()) {
        return video.to_string();
    }
    match &variant.resolution {
        Some(resolution) => format!("{}p", resolution.height),
        None => "unknown".to_string(),
    }
}
