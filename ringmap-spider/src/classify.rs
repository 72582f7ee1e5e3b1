use crate::error::{Result, SpiderError};
use crate::extract::{
    collect_anchors, extract_directory_links, find_platform_api_base, url_to_handle,
};
use crate::fetch::{FetchedPage, Fetcher};
use crate::host::cross_domain;
use crate::record::{ClassificationRecord, RecordCallback};
use crate::rules::{
    FRIEND_LABEL_KEYWORDS, FRIEND_LABEL_MAX_LEN, FRIEND_PATH_KEYWORDS,
    HOMEPAGE_CONTINUE_KEYWORDS, MIX_SPACE_SELECTOR, MIX_SPACE_SIGNATURE,
};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

/// Where a queued page sits in the discovery pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Looking for a link *to* the friends directory.
    Homepage,
    /// On a page believed to *be* the friends directory.
    Directory,
    /// Following a platform JSON API instead of scraping.
    PlatformApi,
}

/// One unit of crawl work. `start_url` is the member homepage that opened
/// this chain; `brute_force` guards the speculative fallbacks so a guessed
/// sibling host cannot spawn further guesses.
#[derive(Debug, Clone)]
struct WorkItem {
    stage: Stage,
    url: String,
    start_url: String,
    brute_force: bool,
}

/// Multi-member friend-link discovery crawler.
///
/// All member homepages are seeded into one shared run: a pool of workers
/// with per-queue round-robin distribution, a global visited set so the same
/// URL is fetched at most once per run, and an append-only record stream.
/// Branch ordering is deliberately unspecified; records are a set, not a
/// sequence.
pub struct Spider {
    fetcher: Arc<dyn Fetcher>,
    visited: Arc<Mutex<HashSet<String>>>,
    records: Arc<Mutex<Vec<ClassificationRecord>>>,
    record_callback: Option<RecordCallback>,
    progress_callback: Option<ProgressCallback>,
}

impl Spider {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            visited: Arc::new(Mutex::new(HashSet::new())),
            records: Arc::new(Mutex::new(Vec::new())),
            record_callback: None,
            progress_callback: None,
        }
    }

    pub fn with_record_callback(mut self, callback: RecordCallback) -> Self {
        self.record_callback = Some(callback);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Run discovery for every member homepage and return all records
    /// produced. Individual branch failures become unreachable records; only
    /// infrastructure faults (worker panics) fail the run.
    pub async fn crawl(&self, start_urls: &[String], workers: usize) -> Result<Vec<ClassificationRecord>> {
        info!(
            "Starting friend-link discovery for {} members with {} workers",
            start_urls.len(),
            workers
        );

        let worker_queues: Arc<Vec<Mutex<VecDeque<WorkItem>>>> =
            Arc::new((0..workers).map(|_| Mutex::new(VecDeque::new())).collect());

        // Seed homepages round-robin; mark them visited up front.
        {
            let mut visited = self.visited.lock().await;
            for (idx, start) in start_urls.iter().enumerate() {
                visited.insert(start.clone());
                let mut queue = worker_queues[idx % workers].lock().await;
                queue.push_back(WorkItem {
                    stage: Stage::Homepage,
                    url: start.clone(),
                    start_url: start.clone(),
                    brute_force: true,
                });
            }
        }

        // Workers only give up once every queue has stayed empty and no item
        // is still being processed; an item counts as in flight until its
        // follow-ups are queued, since those may yet refill the queues.
        let in_flight = Arc::new(AtomicUsize::new(0));
        let mut worker_handles = Vec::new();

        for worker_id in 0..workers {
            let fetcher = self.fetcher.clone();
            let visited = self.visited.clone();
            let records = self.records.clone();
            let record_cb = self.record_callback.clone();
            let progress_cb = self.progress_callback.clone();
            let worker_queues = worker_queues.clone();
            let in_flight = in_flight.clone();

            let handle = tokio::spawn(async move {
                debug!("Worker {} started", worker_id);
                let mut empty_iterations = 0;
                const MAX_EMPTY_ITERATIONS: usize = 10;

                loop {
                    let work_item = {
                        let mut queue = worker_queues[worker_id].lock().await;
                        queue.pop_front()
                    };

                    let Some(item) = work_item else {
                        if all_queues_empty(&worker_queues).await
                            && in_flight.load(Ordering::SeqCst) == 0
                        {
                            empty_iterations += 1;
                            if empty_iterations >= MAX_EMPTY_ITERATIONS {
                                debug!("Worker {} exiting", worker_id);
                                break;
                            }
                        } else {
                            empty_iterations = 0;
                        }
                        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
                        continue;
                    };
                    empty_iterations = 0;

                    if let Some(ref callback) = progress_cb {
                        callback(worker_id, item.url.clone());
                    }

                    in_flight.fetch_add(1, Ordering::SeqCst);
                    let outcome = process_item(fetcher.as_ref(), &item).await;

                    let Outcome { records: new_records, follow_ups } = outcome;

                    {
                        let mut records_lock = records.lock().await;
                        for record in new_records {
                            if let Some(ref cb) = record_cb {
                                cb(&record);
                            }
                            records_lock.push(record);
                        }
                    }

                    // Round-robin follow-ups across all queues, skipping
                    // URLs already dispatched this run.
                    let mut target_worker = 0;
                    for follow_up in follow_ups {
                        let should_queue = {
                            let mut visited_lock = visited.lock().await;
                            visited_lock.insert(follow_up.url.clone())
                        };
                        if should_queue {
                            debug!(
                                "[Worker {}] Queuing {:?} {} to worker {}",
                                worker_id, follow_up.stage, follow_up.url, target_worker
                            );
                            let mut queue = worker_queues[target_worker].lock().await;
                            queue.push_back(follow_up);
                            drop(queue);
                            target_worker = (target_worker + 1) % worker_queues.len();
                        }
                    }

                    // Only now may the other workers treat this item as done.
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                }

                debug!("Worker {} finished", worker_id);
            });

            worker_handles.push(handle);
        }

        for handle in worker_handles {
            handle
                .await
                .map_err(|e| SpiderError::Other(format!("Worker task failed: {}", e)))?;
        }

        let records = self.records.lock().await;
        info!("Discovery complete. {} records emitted", records.len());
        Ok(records.clone())
    }

    pub async fn get_records(&self) -> Vec<ClassificationRecord> {
        self.records.lock().await.clone()
    }

    pub async fn get_visited_count(&self) -> usize {
        self.visited.lock().await.len()
    }
}

async fn all_queues_empty(worker_queues: &Arc<Vec<Mutex<VecDeque<WorkItem>>>>) -> bool {
    for queue in worker_queues.iter() {
        if !queue.lock().await.is_empty() {
            return false;
        }
    }
    true
}

struct Outcome {
    records: Vec<ClassificationRecord>,
    follow_ups: Vec<WorkItem>,
}

impl Outcome {
    fn empty() -> Self {
        Self { records: Vec::new(), follow_ups: Vec::new() }
    }

    fn record(record: ClassificationRecord) -> Self {
        Self { records: vec![record], follow_ups: Vec::new() }
    }
}

async fn process_item(fetcher: &dyn Fetcher, item: &WorkItem) -> Outcome {
    let page = match fetcher.fetch(&item.url).await {
        Ok(page) => page,
        Err(e) => {
            warn!("Fetch failed for {}: {}", item.url, e);
            return match item.stage {
                Stage::Homepage => Outcome::record(ClassificationRecord::HomepageUnreachable {
                    start: item.start_url.clone(),
                    from: item.url.clone(),
                }),
                Stage::Directory => Outcome::record(ClassificationRecord::DirectoryUnreachable {
                    start: item.start_url.clone(),
                    from: item.url.clone(),
                }),
                // API probes fail silently; the page already produced its
                // directory record.
                Stage::PlatformApi => Outcome::empty(),
            };
        }
    };

    match item.stage {
        Stage::Homepage => classify_homepage(item, &page),
        Stage::Directory => classify_directory(item, &page),
        Stage::PlatformApi => classify_platform_api(item, &page),
    }
}

/// Homepage stage: find the one link that leads to the friends directory.
/// Exact path matches beat short keyword labels beat "continue into the
/// blog" hops beat structural guessing; the first acceptable hit stops the
/// scan.
fn classify_homepage(item: &WorkItem, page: &FetchedPage) -> Outcome {
    let unreachable = || {
        Outcome::record(ClassificationRecord::HomepageUnreachable {
            start: item.start_url.clone(),
            from: page.url.clone(),
        })
    };

    if !page.is_success() || !page.is_html() {
        return unreachable();
    }
    let Ok(page_url) = Url::parse(&page.url) else {
        return unreachable();
    };

    let body = page.body_text();
    let anchors = collect_anchors(&body, &page_url);

    // Same-site candidates, deduplicated by literal URL, in page order.
    let mut seen = HashSet::new();
    let candidates: Vec<_> = anchors
        .iter()
        .filter(|a| url_to_handle(&a.url))
        .filter(|a| !cross_domain(&a.url, &page_url))
        .filter(|a| seen.insert(a.url.as_str().to_string()))
        .collect();

    // Pass A: the URL path names a friends page. More trustworthy than any
    // label, so it runs to completion before pass B is even considered.
    for anchor in &candidates {
        let path = anchor.url.path();
        let trimmed = path.strip_suffix(".html").unwrap_or(path);
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
        let trimmed = trimmed.to_lowercase();
        if FRIEND_PATH_KEYWORDS.iter().any(|k| trimmed.contains(k)) {
            return Outcome {
                records: Vec::new(),
                follow_ups: vec![WorkItem {
                    stage: Stage::Directory,
                    url: anchor.url.to_string(),
                    start_url: item.start_url.clone(),
                    brute_force: item.brute_force,
                }],
            };
        }
    }

    // Pass B: a short anchor label that names friend links.
    for anchor in &candidates {
        if anchor.label.chars().count() <= FRIEND_LABEL_MAX_LEN
            && FRIEND_LABEL_KEYWORDS.iter().any(|k| anchor.label.contains(k))
        {
            return Outcome {
                records: Vec::new(),
                follow_ups: vec![WorkItem {
                    stage: Stage::Directory,
                    url: anchor.url.to_string(),
                    start_url: item.start_url.clone(),
                    brute_force: item.brute_force,
                }],
            };
        }
    }

    // Landing pages often only link onward to the actual blog. Scanned over
    // the full anchor set: the blog frequently lives on another host.
    for anchor in &anchors {
        if HOMEPAGE_CONTINUE_KEYWORDS.iter().any(|k| anchor.label.contains(k)) {
            return Outcome {
                records: Vec::new(),
                follow_ups: vec![WorkItem {
                    stage: Stage::Homepage,
                    url: anchor.url.to_string(),
                    start_url: item.start_url.clone(),
                    brute_force: true,
                }],
            };
        }
    }

    let mut follow_ups = Vec::new();
    if item.brute_force
        && let Some(host) = page_url.host_str()
    {
        let scheme = page_url.scheme();

        // Sibling hosts: toggle the www./blog. prefix. Guessed branches get
        // brute_force=false so guessing cannot cascade.
        let sibling_hosts = if let Some(rest) = host.strip_prefix("www.") {
            vec![format!("blog.{}", rest), rest.to_string()]
        } else if let Some(rest) = host.strip_prefix("blog.") {
            vec![rest.to_string(), format!("www.{}", rest)]
        } else {
            vec![format!("blog.{}", host), format!("www.{}", host)]
        };
        for sibling in sibling_hosts {
            follow_ups.push(WorkItem {
                stage: Stage::Homepage,
                url: format!("{}://{}", scheme, sibling),
                start_url: item.start_url.clone(),
                brute_force: false,
            });
        }

        // Direct probes of the two most common directory paths. These race
        // with the sibling branches and are never cancelled; duplicate
        // discoveries collapse at graph-build time.
        for probe_path in ["/links", "/friends"] {
            follow_ups.push(WorkItem {
                stage: Stage::Directory,
                url: format!("{}://{}{}", scheme, host, probe_path),
                start_url: item.start_url.clone(),
                brute_force: false,
            });
        }
    }

    // This branch found nothing itself, even when speculative branches were
    // dispatched above.
    Outcome {
        records: vec![ClassificationRecord::HomepageUnreachable {
            start: item.start_url.clone(),
            from: page.url.clone(),
        }],
        follow_ups,
    }
}

/// Directory stage: harvest friend links from the page, preferring a
/// platform API when the page advertises one.
fn classify_directory(item: &WorkItem, page: &FetchedPage) -> Outcome {
    if !page.is_success() || !page.is_html() {
        return Outcome::record(ClassificationRecord::DirectoryUnreachable {
            start: item.start_url.clone(),
            from: page.url.clone(),
        });
    }

    let mut records = vec![ClassificationRecord::DirectoryFound {
        start: item.start_url.clone(),
        target: page.url.clone(),
    }];

    let body = page.body_text();

    if contains_signature(&page.body, MIX_SPACE_SIGNATURE)
        && let Some(api_base) = find_platform_api_base(&body)
    {
        debug!("Platform API detected on {}: {}", page.url, api_base);
        return Outcome {
            records,
            follow_ups: vec![WorkItem {
                stage: Stage::PlatformApi,
                url: format!("{}/links/all", api_base),
                start_url: item.start_url.clone(),
                brute_force: false,
            }],
        };
    }

    let Ok(page_url) = Url::parse(&page.url) else {
        records.push(ClassificationRecord::DirectoryUnreachable {
            start: item.start_url.clone(),
            from: page.url.clone(),
        });
        return Outcome { records, follow_ups: Vec::new() };
    };

    match extract_directory_links(&body, &page_url) {
        Some(links) => {
            for target in links.targets {
                records.push(ClassificationRecord::LinkFound {
                    start: item.start_url.clone(),
                    from: page.url.clone(),
                    target,
                    selector: links.selector.clone(),
                });
            }
        }
        None => {
            records.push(ClassificationRecord::DirectoryUnreachable {
                start: item.start_url.clone(),
                from: page.url.clone(),
            });
        }
    }

    Outcome { records, follow_ups: Vec::new() }
}

/// Platform API stage: a JSON list of links replaces page scraping. Any
/// failure here is silent; the directory record was already emitted.
fn classify_platform_api(item: &WorkItem, page: &FetchedPage) -> Outcome {
    if !page.is_success() || !page.is_json() {
        return Outcome::empty();
    }
    let Ok(json) = serde_json::from_slice::<serde_json::Value>(&page.body) else {
        return Outcome::empty();
    };
    let Some(entries) = json.get("data").and_then(|d| d.as_array()) else {
        return Outcome::empty();
    };

    let mut records = Vec::new();
    for entry in entries {
        if let Some(target) = entry.get("url").and_then(|u| u.as_str()) {
            records.push(ClassificationRecord::LinkFound {
                start: item.start_url.clone(),
                from: page.url.clone(),
                target: target.to_string(),
                selector: MIX_SPACE_SELECTOR.to_string(),
            });
        }
    }
    Outcome { records, follow_ups: Vec::new() }
}

fn contains_signature(body: &[u8], signature: &[u8]) -> bool {
    if signature.is_empty() || body.len() < signature.len() {
        return false;
    }
    body.windows(signature.len()).any(|window| window == signature)
}
