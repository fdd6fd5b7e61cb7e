//! Device listing for `dualcam list-cameras` and index checks in
//! `NativeCamera::open`.

use nokhwa::query;
use nokhwa::utils::ApiBackend;

use crate::camera::types::{CameraError, CameraInfo};

/// Every capture device the platform backend reports, ordered by index.
///
/// Devices addressed by path rather than by number cannot be selected with
/// `--camera-one`/`--camera-two` and are left out. An empty list is not an
/// error here; the caller decides.
pub fn list_devices() -> Result<Vec<CameraInfo>, CameraError> {
    let devices = query(ApiBackend::Auto).map_err(|e| CameraError::QueryFailed(e.to_string()))?;

    let mut cameras: Vec<CameraInfo> = devices
        .into_iter()
        .filter_map(|d| {
            let index = d.index().as_index().ok()?;
            Some(CameraInfo {
                index,
                name: d.human_name(),
                description: d.description().to_string(),
            })
        })
        .collect();
    cameras.sort_by_key(|c| c.index);
    Ok(cameras)
}
