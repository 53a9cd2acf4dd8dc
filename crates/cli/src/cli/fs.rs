//! Remote commands: each one maps onto a single client operation.

use chrono::DateTime;
use mc_client::{FileInfo, MasterClient, WorkerInfo, UNSET_ID};

use super::Command;

pub async fn run(client: &MasterClient, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Stat { path } => {
            let info = client.get_file_status(UNSET_ID, Some(&path)).await?;
            print_stat(&info);
        }
        Command::Ls { path } => {
            let mut entries = client.list_status(&path).await?;
            entries.sort_by(|a, b| a.path.cmp(&b.path));
            for entry in &entries {
                println!("{}", ls_line(entry));
            }
        }
        Command::Mkdir { path, recursive } => {
            if !client.mkdirs(&path, recursive).await? {
                anyhow::bail!("mkdir {path}: not created");
            }
        }
        Command::Rm { path, recursive } => {
            if !client.delete(UNSET_ID, &path, recursive).await? {
                anyhow::bail!("rm {path}: not deleted");
            }
        }
        Command::Mv { src, dst } => {
            if !client.rename(UNSET_ID, &src, &dst).await? {
                anyhow::bail!("mv {src} {dst}: not renamed");
            }
        }
        Command::Pin { path } => set_pinned(client, &path, true).await?,
        Command::Unpin { path } => set_pinned(client, &path, false).await?,
        Command::Workers => {
            let workers = client.get_workers_info().await?;
            for worker in &workers {
                println!("{}", worker_line(worker));
            }
        }
        Command::Capacity => {
            let capacity = client.get_capacity_bytes().await?;
            let used = client.get_used_bytes().await?;
            println!("capacity  {capacity}");
            println!("used      {used}");
            println!("free      {}", capacity.saturating_sub(used));
        }
        Command::Session => {
            let id = client.session_id().await?;
            let master = client
                .master_address()
                .await
                .map_or_else(|| "-".to_string(), |a| a.to_string());
            println!("session {id} @ {master}");
        }
        Command::Config(_) => anyhow::bail!("config commands do not talk to the master"),
    }
    Ok(())
}

async fn set_pinned(client: &MasterClient, path: &str, pinned: bool) -> anyhow::Result<()> {
    let info = client.get_file_status(UNSET_ID, Some(path)).await?;
    client.set_pinned(info.id, pinned).await?;
    Ok(())
}

fn format_ms(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".into())
}

fn print_stat(info: &FileInfo) {
    println!("path        {}", info.path);
    println!("id          {}", info.id);
    println!("type        {}", if info.is_folder { "folder" } else { "file" });
    println!("length      {}", info.length);
    println!("block size  {}", info.block_size_bytes);
    println!("blocks      {}", info.block_ids.len());
    println!("created     {}", format_ms(info.creation_time_ms));
    println!("complete    {}", info.is_complete);
    println!("pinned      {}", info.is_pinned);
    println!("in memory   {}%", info.in_memory_percentage);
    if !info.ufs_path.is_empty() {
        println!("ufs path    {}", info.ufs_path);
    }
}

fn ls_line(info: &FileInfo) -> String {
    let kind = if info.is_folder { 'd' } else { '-' };
    let pin = if info.is_pinned { 'p' } else { '-' };
    format!(
        "{kind}{pin} {:>12} {:>4}% {} {}",
        info.length,
        info.in_memory_percentage,
        format_ms(info.creation_time_ms),
        info.path,
    )
}

fn worker_line(worker: &WorkerInfo) -> String {
    format!(
        "{:>6} {}:{} {:<8} {:>14}/{:<14} last contact {}s",
        worker.id,
        worker.address.host,
        worker.address.rpc_port,
        worker.state,
        worker.used_bytes,
        worker.capacity_bytes,
        worker.last_contact_sec,
    )
}
