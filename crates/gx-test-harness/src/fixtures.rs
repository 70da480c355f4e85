//! Workflow documents and upload files used by the test suites

use std::path::{Path, PathBuf};

use gx_client_api::GalaxyApi;
use gx_rest_api_contract::UploadFile;
use tracing::debug;

use crate::error::{HarnessError, HarnessResult};

pub const UPLOAD_TOOL: &str = "upload1";

/// A directory of fixture files
#[derive(Debug, Clone)]
pub struct Fixtures {
    dir: PathBuf,
}

impl Fixtures {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Read a `.ga` workflow document as text.
    pub fn workflow_json(&self, name: &str) -> HarnessResult<String> {
        Ok(std::fs::read_to_string(self.path(name))?)
    }

    pub fn upload_file(&self, name: &str) -> HarnessResult<UploadFile> {
        let path = self.path(name);
        if !path.is_file() {
            return Err(HarnessError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("missing fixture {}", path.display()),
            )));
        }
        Ok(UploadFile::new(name, path))
    }

    /// Upload a fixture into a history and return the new dataset's id.
    pub async fn upload(
        &self,
        api: &dyn GalaxyApi,
        history_id: &str,
        name: &str,
    ) -> HarnessResult<String> {
        let file = self.upload_file(name)?;
        let run = api.run_upload(UPLOAD_TOOL, history_id, &[file]).await?;
        let output = run
            .outputs
            .into_iter()
            .next()
            .ok_or_else(|| HarnessError::Unexpected(format!("upload of {} produced no dataset", name)))?;
        debug!(dataset_id = %output.id, history_id, "uploaded fixture {}", name);
        Ok(output.id)
    }
}
