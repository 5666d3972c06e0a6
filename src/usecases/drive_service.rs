//! OneDrive and SharePoint document libraries.
//!
//! Both are Graph drives; `DriveTarget` picks `/users/{u}/drive` or `/sites/{s}/drive`.

use crate::adapters::graph::odata;
use crate::domain::{
    CloneReport, CopiedItem, DomainError, DriveTarget, FailedItem, LinkScope, LinkType,
    SkippedItem,
};
use crate::ports::{GraphPort, ProgressPort};
use serde_json::{Value, json};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

pub const DEFAULT_DRIVE_TOP: u32 = 50;
pub const DEFAULT_SEARCH_TOP: u32 = 25;
/// Page size used when listing both roots for a clone.
const CLONE_LIST_TOP: u32 = 999;

pub const SKIP_FOLDER: &str = "folder_not_supported_yet";
pub const SKIP_EXISTS: &str = "exists_in_target";

pub struct DriveService {
    graph: Arc<dyn GraphPort>,
}

impl DriveService {
    pub fn new(graph: Arc<dyn GraphPort>) -> Self {
        Self { graph }
    }

    pub async fn list_root(&self, target: &DriveTarget, top: u32) -> Result<Vec<Value>, DomainError> {
        self.list(&format!("{}/root/children", target.drive_path()), top)
            .await
    }

    pub async fn children(
        &self,
        target: &DriveTarget,
        item_id: &str,
        top: u32,
    ) -> Result<Vec<Value>, DomainError> {
        self.list(
            &format!("{}/items/{item_id}/children", target.drive_path()),
            top,
        )
        .await
    }

    /// `root/search(q='...')`; quotes in the query are doubled.
    pub async fn search(
        &self,
        target: &DriveTarget,
        query: &str,
        top: u32,
    ) -> Result<Vec<Value>, DomainError> {
        let q = urlencoding::encode(&odata::escape_literal(query)).into_owned();
        self.list(&format!("{}/root/search(q='{q}')", target.drive_path()), top)
            .await
    }

    /// Save the item's content to `dest`. Returns bytes written.
    pub async fn download(
        &self,
        target: &DriveTarget,
        item_id: &str,
        dest: &Path,
    ) -> Result<u64, DomainError> {
        let written = self
            .graph
            .download(
                &format!("{}/items/{item_id}/content", target.drive_path()),
                dest,
            )
            .await?;
        info!(drive = %target, item_id, dest = %dest.display(), bytes = written, "downloaded item");
        Ok(written)
    }

    /// Upload a local file to `remote_path` (e.g. `Reports/q1.xlsx`), replacing any existing file.
    pub async fn upload(
        &self,
        target: &DriveTarget,
        local_path: &Path,
        remote_path: &str,
    ) -> Result<Value, DomainError> {
        let remote = odata::encode_drive_path(remote_path);
        if remote.is_empty() {
            return Err(DomainError::InvalidInput(
                "remote path must name a file".to_string(),
            ));
        }
        let content = tokio::fs::read(local_path).await.map_err(|e| {
            DomainError::Io(format!("read {}: {}", local_path.display(), e))
        })?;
        let bytes = content.len();
        let item = self
            .graph
            .upload(
                &format!("{}/root:/{remote}:/content", target.drive_path()),
                content,
            )
            .await?;
        info!(drive = %target, remote = %remote_path, bytes, "uploaded file");
        Ok(item)
    }

    pub async fn delete(&self, target: &DriveTarget, item_id: &str) -> Result<(), DomainError> {
        self.graph
            .delete(&format!("{}/items/{item_id}", target.drive_path()))
            .await?;
        info!(drive = %target, item_id, "deleted item");
        Ok(())
    }

    pub async fn create_link(
        &self,
        target: &DriveTarget,
        item_id: &str,
        link_type: LinkType,
        scope: LinkScope,
    ) -> Result<Value, DomainError> {
        self.graph
            .post(
                &format!("{}/items/{item_id}/createLink", target.drive_path()),
                json!({ "type": link_type.as_str(), "scope": scope.as_str() }),
            )
            .await
    }

    /// Copy the top-level files of `source` into the root of `target`.
    ///
    /// Folders are skipped, as are names already present in the target unless
    /// `overwrite`. A failing file is recorded and the copy moves on.
    pub async fn clone_root(
        &self,
        source: &DriveTarget,
        target: &DriveTarget,
        overwrite: bool,
        tmp_dir: &Path,
        progress: &dyn ProgressPort,
    ) -> Result<CloneReport, DomainError> {
        tokio::fs::create_dir_all(tmp_dir)
            .await
            .map_err(|e| DomainError::Io(format!("create {}: {}", tmp_dir.display(), e)))?;

        let source_items = self.list_root(source, CLONE_LIST_TOP).await?;
        let target_names: HashSet<String> = self
            .list_root(target, CLONE_LIST_TOP)
            .await?
            .iter()
            .map(|item| odata::str_field(item, "name"))
            .collect();

        let mut report = CloneReport::default();
        progress.start(source_items.len() as u64);

        for item in &source_items {
            let name = odata::str_field(item, "name");
            if name.is_empty() {
                progress.advance("");
                continue;
            }
            if item.get("folder").is_some() {
                report.skipped.push(SkippedItem {
                    name: name.clone(),
                    reason: SKIP_FOLDER.to_string(),
                });
            } else if !overwrite && target_names.contains(&name) {
                report.skipped.push(SkippedItem {
                    name: name.clone(),
                    reason: SKIP_EXISTS.to_string(),
                });
            } else {
                let item_id = odata::str_field(item, "id");
                if !item_id.is_empty() {
                    match self.copy_file(source, target, &item_id, &name, tmp_dir).await {
                        Ok(()) => report.copied.push(CopiedItem { name: name.clone() }),
                        Err(e) => {
                            warn!(file = %name, error = %e, "clone: copy failed");
                            report.failed.push(FailedItem {
                                name: name.clone(),
                                error: e.to_string(),
                            });
                        }
                    }
                }
            }
            progress.advance(&name);
        }
        progress.finish();

        info!(
            source = %source,
            target = %target,
            copied = report.copied.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "clone finished"
        );
        Ok(report)
    }

    async fn copy_file(
        &self,
        source: &DriveTarget,
        target: &DriveTarget,
        item_id: &str,
        name: &str,
        tmp_dir: &Path,
    ) -> Result<(), DomainError> {
        let local = tmp_dir.join(name);
        self.download(source, item_id, &local).await?;
        let uploaded = self.upload(target, &local, name).await;
        let _ = tokio::fs::remove_file(&local).await;
        uploaded.map(|_| ())
    }

    async fn list(&self, path: &str, top: u32) -> Result<Vec<Value>, DomainError> {
        let result = self.graph.get_with(path, &[("$top", top.to_string())]).await?;
        Ok(odata::collection(result))
    }
}
