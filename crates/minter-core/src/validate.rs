//! Entry gate for mint requests.
//!
//! The asset check is a deliberate, cheap boundary check on the declared
//! descriptor. It never reads file content and it is not a content
//! sniffer.

use crate::types::{AssetDescriptor, MintRequest};

/// Size ceiling for uploaded assets (10 MiB).
pub const MAX_ASSET_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("provide a token uri, or all of asset file, display name and creator name")]
    IncompleteRequest,
    #[error("file must be an image, got declared type {0:?}")]
    NotAnImage(String),
    #[error("file too large: {size_bytes} bytes exceeds the {max_bytes} byte ceiling")]
    TooLarge { size_bytes: u64, max_bytes: u64 },
}

/// Checks the declared media type and size of a selected asset.
pub fn validate_asset(descriptor: &AssetDescriptor) -> Result<(), ValidationError> {
    if !descriptor.content_type.starts_with("image/") {
        return Err(ValidationError::NotAnImage(descriptor.content_type.clone()));
    }
    if descriptor.size_bytes > MAX_ASSET_BYTES {
        return Err(ValidationError::TooLarge {
            size_bytes: descriptor.size_bytes,
            max_bytes: MAX_ASSET_BYTES,
        });
    }
    Ok(())
}

/// Enforces the request invariant: a pre-built token URI, or a complete
/// asset/name/creator triple. When an asset is present it is validated too.
pub fn validate_request(request: &MintRequest) -> Result<(), ValidationError> {
    if request.token_uri_override.is_some() {
        return Ok(());
    }
    let complete = request.asset.is_some()
        && !request.display_name.trim().is_empty()
        && !request.creator_name.trim().is_empty();
    if !complete {
        return Err(ValidationError::IncompleteRequest);
    }
    if let Some(asset) = &request.asset {
        validate_asset(&asset.descriptor)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AssetUpload, TokenUri};

    fn descriptor(content_type: &str, size_bytes: u64) -> AssetDescriptor {
        AssetDescriptor {
            file_name: "art.png".to_string(),
            content_type: content_type.to_string(),
            size_bytes,
        }
    }

    #[test]
    fn accepts_small_image() {
        assert!(validate_asset(&descriptor("image/jpeg", 2 * 1024 * 1024)).is_ok());
    }

    #[test]
    fn rejects_non_image_type() {
        let err = validate_asset(&descriptor("application/pdf", 1024)).unwrap_err();
        assert!(matches!(err, ValidationError::NotAnImage(t) if t == "application/pdf"));
    }

    #[test]
    fn rejects_oversize_without_touching_content() {
        // 15 MB PNG: only the declared size is consulted.
        let err = validate_asset(&descriptor("image/png", 15 * 1024 * 1024)).unwrap_err();
        assert!(matches!(err, ValidationError::TooLarge { .. }));
        assert!(err.to_string().contains("file too large"));
    }

    #[test]
    fn boundary_size_is_allowed() {
        assert!(validate_asset(&descriptor("image/png", MAX_ASSET_BYTES)).is_ok());
        assert!(validate_asset(&descriptor("image/png", MAX_ASSET_BYTES + 1)).is_err());
    }

    #[test]
    fn override_uri_satisfies_the_request_invariant() {
        let req = MintRequest::with_token_uri(TokenUri("ipfs://bafkbadge".to_string()));
        assert!(validate_request(&req).is_ok());
    }

    #[test]
    fn incomplete_request_is_rejected() {
        let req = MintRequest {
            asset: Some(AssetUpload::from_bytes("a.png", "image/png", vec![0u8; 16])),
            display_name: "Trailblazer".to_string(),
            creator_name: "".to_string(),
            token_uri_override: None,
        };
        assert_eq!(
            validate_request(&req).unwrap_err(),
            ValidationError::IncompleteRequest
        );
    }

    #[test]
    fn complete_request_passes() {
        let req = MintRequest::new(
            AssetUpload::from_bytes("a.jpg", "image/jpeg", vec![0u8; 64]),
            "Trailblazer",
            "Ada",
        );
        assert!(validate_request(&req).is_ok());
    }
}
