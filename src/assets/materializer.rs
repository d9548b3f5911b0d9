use crate::crawler::Fetcher;
use crate::AssetError;
use std::path::Path;
use url::Url;

/// Downloads book assets to their local destinations
///
/// Every download is fetched completely before the destination is touched, so a
/// failed fetch never leaves a partial file behind. Writing the same inputs twice
/// yields a byte-identical file.
#[derive(Debug, Clone)]
pub struct AssetMaterializer {
    fetcher: Fetcher,
}

impl AssetMaterializer {
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }

    /// Downloads a book text to `book_path`
    pub async fn download_text(&self, text_url: &Url, book_path: &Path) -> Result<u64, AssetError> {
        self.download(text_url, book_path).await
    }

    /// Downloads a cover image to `image_path`
    pub async fn download_image(
        &self,
        image_url: &Url,
        image_path: &Path,
    ) -> Result<u64, AssetError> {
        self.download(image_url, image_path).await
    }

    /// Fetches `url` and writes the body to `dest`, returning the bytes written
    async fn download(&self, url: &Url, dest: &Path) -> Result<u64, AssetError> {
        let response = self.fetcher.fetch(url).await?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| io_error(parent, source))?;
        }

        tokio::fs::write(dest, &response.body)
            .await
            .map_err(|source| io_error(dest, source))?;

        tracing::debug!("Wrote {} bytes from {} to {}", response.body.len(), url, dest.display());

        Ok(response.body.len() as u64)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> AssetError {
    AssetError::Io {
        path: path.display().to_string(),
        source,
    }
}
