//! Turns raw arguments into scheduled entries.
//!
//! Expansion runs depth-first on the calling thread. Directories are listed
//! in name order and file lists are read line by line, so every entry gets
//! its [`Order`] before any counting result comes back.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use reqwest::blocking::Client;

use crate::config::ReadOptions;
use crate::entry::{Entry, STDIN_NAME, StdinHandle, is_url};
use crate::error::EngineError;
use crate::executor::Executor;
use crate::gitignore::{IGNORE_FILE, IgnoreScope};
use crate::order::Order;

pub(crate) struct Expander<'a> {
    executor: &'a Executor,
    read: &'a ReadOptions,
    client: &'a Client,
    stdin: &'a StdinHandle,
}

impl<'a> Expander<'a> {
    pub(crate) fn new(
        executor: &'a Executor,
        read: &'a ReadOptions,
        client: &'a Client,
        stdin: &'a StdinHandle,
    ) -> Self {
        Self {
            executor,
            read,
            client,
            stdin,
        }
    }

    /// With no arguments, stdin is either counted or read as a file list.
    pub(crate) fn expand_args(&self, args: &[String]) {
        let scope = IgnoreScope::root(".", !self.read.no_ignore);
        if args.is_empty() {
            let order = Order::root();
            if self.read.file_list {
                self.read_file_list(STDIN_NAME, &order, self.stdin.clone(), &scope);
            } else {
                self.executor.schedule(Entry::stdin(order, self.stdin.clone()));
            }
            return;
        }
        let mut order = Order::root();
        for arg in args {
            if is_url(arg) || !scope.is_ignored(arg, Path::new(arg).is_dir()) {
                self.expand_item(arg, &order, &scope, self.read.file_list);
            } else {
                log::trace!("{arg}: ignored");
            }
            order = order.next();
        }
    }

    fn expand_item(&self, item: &str, order: &Order, scope: &IgnoreScope, file_list: bool) {
        if is_url(item) {
            let entry = self.url_entry(item, order.clone());
            if !file_list {
                self.executor.schedule(entry);
                return;
            }
            match entry.open() {
                Ok(stream) => self.read_file_list(item, order, stream, scope),
                Err(err) => self.executor.send(Err(err)),
            }
            return;
        }
        self.expand_path(Path::new(item), order, scope, file_list);
    }

    fn expand_path(&self, path: &Path, order: &Order, scope: &IgnoreScope, file_list: bool) {
        let name = path.to_string_lossy();
        if path.is_dir() {
            self.expand_dir(path, order, scope);
        } else if !path.is_file() {
            self.executor.send(Err(EngineError::NotFound {
                name: name.into_owned(),
            }));
        } else if file_list {
            match File::open(path) {
                Ok(file) => self.read_file_list(&name, order, file, scope),
                Err(source) => self.executor.send(Err(EngineError::Open {
                    name: name.into_owned(),
                    source,
                })),
            }
        } else {
            self.executor.schedule(Entry::file(path, order.clone()));
        }
    }

    fn expand_dir(&self, dir: &Path, order: &Order, parent: &IgnoreScope) {
        let scope = parent.child(dir, !self.read.no_ignore);
        let mut children = match fs::read_dir(dir) {
            Ok(listing) => listing.filter_map(|item| item.ok()).collect::<Vec<_>>(),
            Err(source) => {
                self.executor.send(Err(EngineError::Open {
                    name: dir.to_string_lossy().into_owned(),
                    source,
                }));
                return;
            }
        };
        children.sort_by_key(|child| child.file_name());

        let mut child_order = order.sub();
        for child in children {
            let file_name = child.file_name();
            let file_name = file_name.to_string_lossy();
            if !self.read.hidden && file_name.starts_with('.') {
                continue;
            }
            if !self.read.no_ignore && file_name == IGNORE_FILE {
                continue;
            }
            let path = child.path();
            // linked directories are not followed
            if child.file_type().is_ok_and(|kind| kind.is_symlink()) && path.is_dir() {
                log::trace!("{}: symlinked directory skipped", path.display());
                continue;
            }
            if scope.is_ignored(&path, path.is_dir()) {
                log::trace!("{}: ignored", path.display());
                continue;
            }
            self.expand_path(&path, &child_order, &scope, false);
            child_order = child_order.next();
        }
    }

    /// Every non-blank, non-ignored line is expanded as an argument of its
    /// own, one level below `order`.
    fn read_file_list<R: Read>(&self, name: &str, order: &Order, list: R, scope: &IgnoreScope) {
        let mut line_order = order.sub();
        for line in BufReader::new(list).lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    self.executor.send(Err(EngineError::read(name, err)));
                    return;
                }
            };
            let item = line.trim();
            if !item.is_empty() && !scope.is_ignored(item, false) {
                self.expand_item(item, &line_order, scope, false);
            }
            line_order = line_order.next();
        }
    }

    fn url_entry(&self, url: &str, order: Order) -> Entry {
        if self.read.store_content {
            Entry::download(url, order, self.client.clone(), self.read.store_dir.clone())
        } else {
            Entry::url(url, order, self.client.clone())
        }
    }
}
