use super::{ClassifiedLine, LineKind, Result, Run, SummaryError};

/// Lazily partitions an iterator into maximal runs of adjacent items for which
/// `same(previous, next)` holds.
pub struct GroupRuns<I: Iterator, F> {
    iter: I,
    same: F,
    pending: Option<I::Item>,
}

impl<I, F> Iterator for GroupRuns<I, F>
where
    I: Iterator,
    F: FnMut(&I::Item, &I::Item) -> bool,
{
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.pending.take().or_else(|| self.iter.next())?;
        let mut group = vec![first];
        for item in self.iter.by_ref() {
            let joins = group.last().is_some_and(|last| (self.same)(last, &item));
            if !joins {
                self.pending = Some(item);
                break;
            }
            group.push(item);
        }
        Some(group)
    }
}

pub trait GroupRunsExt: Iterator + Sized {
    fn group_runs<F>(self, same: F) -> GroupRuns<Self, F>
    where
        F: FnMut(&Self::Item, &Self::Item) -> bool,
    {
        GroupRuns {
            iter: self,
            same,
            pending: None,
        }
    }
}

impl<I: Iterator> GroupRunsExt for I {}

/// Two adjacent lines share a package when a package line is followed by a class
/// line, or a class line by another class line.
pub fn same_package(first: &ClassifiedLine, second: &ClassifiedLine) -> bool {
    matches!(
        (first.kind, second.kind),
        (LineKind::Package, LineKind::Class) | (LineKind::Class, LineKind::Class)
    )
}

fn same_run(first: &Result<ClassifiedLine>, second: &Result<ClassifiedLine>) -> bool {
    match (first, second) {
        (Ok(first), Ok(second)) => same_package(first, second),
        _ => false,
    }
}

type SameRun = fn(&Result<ClassifiedLine>, &Result<ClassifiedLine>) -> bool;

/// Turns classified lines into package runs, stopping at the first error.
pub struct Runs<I: Iterator<Item = Result<ClassifiedLine>>> {
    groups: GroupRuns<I, SameRun>,
    failed: bool,
}

impl<I> Runs<I>
where
    I: Iterator<Item = Result<ClassifiedLine>>,
{
    pub fn new(lines: I) -> Self {
        Self {
            groups: lines.group_runs(same_run as SameRun),
            failed: false,
        }
    }

    fn to_run(
        head: Result<ClassifiedLine>,
        lines: impl Iterator<Item = Result<ClassifiedLine>>,
    ) -> Result<Run> {
        let head = head?;
        if head.kind != LineKind::Package {
            return Err(SummaryError::UngroupedClassLine {
                line_number: head.line_number,
                line: head.text,
            });
        }
        let class_lines = lines.collect::<Result<Vec<_>>>()?;
        Ok(Run {
            package_line: head,
            class_lines,
        })
    }
}

impl<I> Iterator for Runs<I>
where
    I: Iterator<Item = Result<ClassifiedLine>>,
{
    type Item = Result<Run>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let mut group = self.groups.next()?.into_iter();
        let run = Self::to_run(group.next()?, group);
        self.failed = run.is_err();
        Some(run)
    }
}
