use super::test_helpers::{
    ScriptedExtractor, ScriptedFetcher, create_recording_downloader, create_test_downloader,
    wait_until_settled,
};
use super::*;
use crate::config::FetchPolicy;
use crate::types::{ExtractMode, Quality, TaskState};
use std::time::Duration;


const PLAYLIST: &str = "https://www.youtube.com/playlist?list=PL1";

fn titles(tasks: &[crate::types::Task]) -> Vec<&str> {
    tasks.iter().map(|t| t.title.as_str()).collect()
}

fn urls(tasks: &[crate::types::Task]) -> Vec<&str> {
    tasks.iter().map(|t| t.source_url.as_str()).collect()
}
