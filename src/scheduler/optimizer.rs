//! Multi-phase greedy schedule optimizer.
//!
//! # Algorithm
//!
//! Six phases run strictly in order over one run-scoped load tracker;
//! each phase scans (location, day, time) cells and commits assignments
//! only after `can_assign` passes:
//!
//! 0. Seed the curated locked classes.
//! 1. Fill every open cell from historic per-cell rankings.
//! 2. Push under-utilized instructors toward their weekly target.
//! 3. Guarantee a weekly floor for the core formats.
//! 4. Consolidate shifts onto fewer instructors (plan, then commit).
//! 5. Balance morning/evening distribution (plan, then commit).
//!
//! Greedy and best-effort throughout: an unsatisfiable cell is a logged
//! gap, a failed reassignment is skipped, and no phase can fail the run.
//! The weekly hour cap is a generation target, not a guarantee — the
//! final audit reports any breach as a warning on the returned schedule.

use std::collections::{HashMap, HashSet};

use crate::config::ScheduleConfig;
use crate::models::{
    ClassAssignment, DayOfWeek, HistoricClassRecord, Instructor, InstructorId, InstructorTier,
    ScheduleWarning, Shift, TimeOfDay, WarningKind, WeeklySchedule,
};
use crate::rules::Rules;
use crate::stats::{aggregate, PerformanceStat};
use crate::tracker::InstructorLoadTracker;

/// What the optimizer maximizes when ranking candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptimizationGoal {
    /// Blend of attendance and revenue.
    #[default]
    Balanced,
    /// Historic revenue only.
    Revenue,
    /// Historic attendance only.
    Attendance,
}

/// Options for one optimization run.
#[derive(Debug, Clone, Default)]
pub struct OptimizerOptions {
    /// Restrict generation to a single day. `None` = full week.
    pub target_day: Option<DayOfWeek>,
    /// Ranking objective.
    pub goal: OptimizationGoal,
}

impl OptimizerOptions {
    /// Creates default options (full week, balanced goal).
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the run to one day.
    pub fn with_target_day(mut self, day: DayOfWeek) -> Self {
        self.target_day = Some(day);
        self
    }

    /// Sets the ranking objective.
    pub fn with_goal(mut self, goal: OptimizationGoal) -> Self {
        self.goal = goal;
        self
    }
}

/// The multi-phase schedule optimizer.
///
/// Stateless across runs: every call to [`generate`](Self::generate)
/// builds its own tracker and working state, so independent strategies
/// can run concurrently against shared records.
#[derive(Debug, Clone)]
pub struct ScheduleOptimizer {
    rules: Rules,
}

// Per-cell format ranking index: (location, day, time) → format stats.
type CellIndex = HashMap<(String, DayOfWeek, TimeOfDay), Vec<(String, PerformanceStat)>>;
// Per-cell instructor index: (format, location, day, time) → instructor stats.
type CellInstructorIndex =
    HashMap<(String, String, DayOfWeek, TimeOfDay), Vec<(InstructorId, PerformanceStat)>>;

/// Working state for one optimization run.
struct Run<'a> {
    roster: &'a [Instructor],
    days: Vec<DayOfWeek>,
    locations: Vec<String>,
    schedule: WeeklySchedule,
    tracker: InstructorLoadTracker,
    cell_formats: CellIndex,
    cell_instructors: CellInstructorIndex,
    /// Per-instructor global format performance (specialty ranking).
    instructor_formats: HashMap<InstructorId, Vec<(String, PerformanceStat)>>,
    /// Per-format global instructor performance.
    format_instructors: HashMap<String, Vec<(InstructorId, PerformanceStat)>>,
    next_id: usize,
}

/// A planned instructor reassignment (phase 4).
#[derive(Debug, Clone)]
struct ReassignMove {
    assignment_id: String,
    to: InstructorId,
}

/// A planned time move within a day (phase 5).
#[derive(Debug, Clone)]
struct TimeMove {
    assignment_id: String,
    new_time: TimeOfDay,
}

impl ScheduleOptimizer {
    /// Creates an optimizer from a configuration.
    pub fn new(config: ScheduleConfig) -> Self {
        Self {
            rules: Rules::new(config),
        }
    }

    /// The rule set this optimizer enforces.
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Generates a weekly schedule from historic records and a roster.
    ///
    /// Never fails: unfillable cells and post-hoc cap breaches are
    /// reported on the returned schedule's warning list.
    pub fn generate(
        &self,
        records: &[HistoricClassRecord],
        roster: &[Instructor],
        options: &OptimizerOptions,
    ) -> WeeklySchedule {
        let mut run = self.prepare_run(records, roster, options);
        log::info!(
            "optimizing {} location(s) over {} day(s), {} historic record(s), goal {:?}",
            run.locations.len(),
            run.days.len(),
            records.len(),
            options.goal
        );

        self.seed_locked_classes(&mut run);
        self.fill_slots(&mut run);
        self.maximize_utilization(&mut run);
        self.enforce_diversity(&mut run);
        self.consolidate_shifts(&mut run);
        self.balance_shifts(&mut run);
        self.audit(&mut run);

        log::info!(
            "generated {} assignment(s), {} warning(s)",
            run.schedule.assignment_count(),
            run.schedule.warnings.len()
        );
        run.schedule
    }

    fn prepare_run<'a>(
        &self,
        records: &'a [HistoricClassRecord],
        roster: &'a [Instructor],
        options: &'a OptimizerOptions,
    ) -> Run<'a> {
        let days = match options.target_day {
            Some(day) => vec![day],
            None => DayOfWeek::ALL.to_vec(),
        };

        let mut locations: HashSet<String> =
            records.iter().map(|r| r.location.clone()).collect();
        for seed in &self.rules.config().locked_seeds {
            locations.insert(seed.location.clone());
        }
        let mut locations: Vec<String> = locations.into_iter().collect();
        locations.sort();

        let goal = options.goal;

        // Cell-level format ranking.
        let mut cell_formats: CellIndex = HashMap::new();
        for (key, stat) in aggregate(records, false) {
            cell_formats
                .entry((key.location, key.day, key.time))
                .or_default()
                .push((key.format, stat));
        }
        for ranking in cell_formats.values_mut() {
            sort_by_score(ranking, goal, |(format, _)| format.clone());
        }

        // Cell-level instructor ranking per format.
        let mut cell_instructors: CellInstructorIndex = HashMap::new();
        let mut instructor_formats: HashMap<InstructorId, HashMap<String, PerformanceStat>> =
            HashMap::new();
        let mut format_instructors: HashMap<String, HashMap<InstructorId, PerformanceStat>> =
            HashMap::new();
        for (key, stat) in aggregate(records, true) {
            let instructor = match key.instructor {
                Some(id) => id,
                None => continue,
            };
            cell_instructors
                .entry((key.format.clone(), key.location, key.day, key.time))
                .or_default()
                .push((instructor.clone(), stat.clone()));

            let by_format = instructor_formats.entry(instructor.clone()).or_default();
            merge_stat(by_format.entry(key.format.clone()).or_default(), &stat);
            let by_instructor = format_instructors.entry(key.format).or_default();
            merge_stat(by_instructor.entry(instructor).or_default(), &stat);
        }
        for ranking in cell_instructors.values_mut() {
            sort_by_score(ranking, goal, |(id, _)| id.as_str().to_string());
        }

        let instructor_formats = instructor_formats
            .into_iter()
            .map(|(id, formats)| {
                let mut ranked: Vec<(String, PerformanceStat)> = formats.into_iter().collect();
                sort_by_score(&mut ranked, goal, |(format, _)| format.clone());
                (id, ranked)
            })
            .collect();
        let format_instructors = format_instructors
            .into_iter()
            .map(|(format, instructors)| {
                let mut ranked: Vec<(InstructorId, PerformanceStat)> =
                    instructors.into_iter().collect();
                sort_by_score(&mut ranked, goal, |(id, _)| id.as_str().to_string());
                (format, ranked)
            })
            .collect();

        Run {
            roster,
            days,
            locations,
            schedule: WeeklySchedule::new(),
            tracker: InstructorLoadTracker::new(roster, self.rules.clone()),
            cell_formats,
            cell_instructors,
            instructor_formats,
            format_instructors,
            next_id: 1,
        }
    }

    // ---------------- Phase 0: locked seed classes ----------------

    fn seed_locked_classes(&self, run: &mut Run<'_>) {
        let seeds = self.rules.config().locked_seeds.clone();
        for seed in &seeds {
            if !run.days.contains(&seed.day) {
                continue;
            }
            if !self.rules.format_allowed_at(&seed.class_format, &seed.location) {
                log::warn!(
                    "seed class {} is not allowed at {}, skipping",
                    seed.class_format,
                    seed.location
                );
                continue;
            }
            let instructor = InstructorId::from_name(&seed.instructor);
            let duration = self.rules.class_duration(&seed.class_format);
            if let Err(rejection) = run.tracker.can_assign(
                &instructor,
                seed.day,
                &seed.location,
                duration,
                &seed.class_format,
            ) {
                log::warn!("seed class {} skipped: {rejection}", seed.class_format);
                continue;
            }

            let display_name = run
                .roster
                .iter()
                .find(|i| i.id == instructor)
                .map(|i| i.display_name())
                .unwrap_or_else(|| seed.instructor.clone());

            let stat = run
                .cell_instructors
                .get(&(
                    seed.class_format.clone(),
                    seed.location.clone(),
                    seed.day,
                    seed.time,
                ))
                .and_then(|ranking| ranking.iter().find(|(id, _)| *id == instructor))
                .map(|(_, stat)| stat.clone());

            let mut assignment = ClassAssignment::new(
                next_id(run),
                seed.day,
                seed.time,
                &seed.location,
                &seed.class_format,
                instructor.clone(),
                display_name,
            )
            .with_duration(duration)
            .locked()
            .top_performer();
            if let Some(stat) = stat {
                assignment = assignment
                    .with_expected_participants(stat.rounded_avg_participants())
                    .with_expected_revenue(stat.rounded_avg_revenue());
            }

            run.tracker
                .commit(&instructor, seed.day, seed.time, &seed.location, duration);
            run.schedule.add_assignment(assignment);
        }
        log::debug!(
            "phase 0: {} locked class(es) seeded",
            run.schedule.assignment_count()
        );
    }

    // ---------------- Phase 1: fill open slots ----------------

    fn fill_slots(&self, run: &mut Run<'_>) {
        let slots = self.rules.available_slots();
        let locations = run.locations.clone();
        let days = run.days.clone();
        let mut placed = 0usize;

        for location in &locations {
            for &day in &days {
                let guidelines = self.rules.day_guidelines(day);
                for &time in &slots {
                    let target = if self.rules.is_peak(time) {
                        self.rules.parallel_capacity(location)
                    } else {
                        1
                    };
                    loop {
                        if run.schedule.count_for_day(day, location) >= guidelines.max_classes {
                            break;
                        }
                        let occupied =
                            run.schedule.assignments_in_cell(day, time, location).len();
                        if occupied >= target {
                            break;
                        }
                        let Some(format) = self.pick_format(run, location, day, time) else {
                            break;
                        };
                        if !self.place_class(run, location, day, time, &format) {
                            break;
                        }
                        placed += 1;
                    }
                }
            }
        }
        log::debug!("phase 1: {placed} class(es) placed");
    }

    /// Picks the best unused candidate format for a cell, preferring the
    /// day's priority formats over the plain performance ranking.
    fn pick_format(
        &self,
        run: &Run<'_>,
        location: &str,
        day: DayOfWeek,
        time: TimeOfDay,
    ) -> Option<String> {
        let guidelines = self.rules.day_guidelines(day);
        let ranking = run
            .cell_formats
            .get(&(location.to_string(), day, time))?;

        let usable = |format: &str, stat: &PerformanceStat| {
            stat.avg_participants() >= self.rules.config().fill_min_average
                && !run.schedule.format_in_cell(day, time, location, format)
                && self.rules.format_allowed_at(format, location)
                && !self.rules.is_excluded_format(format)
                && !guidelines
                    .avoid_formats
                    .iter()
                    .any(|f| f.eq_ignore_ascii_case(format))
        };

        // Priority formats first, in guideline order.
        for priority in &guidelines.priority_formats {
            if let Some((format, stat)) = ranking
                .iter()
                .find(|(f, _)| f.eq_ignore_ascii_case(priority))
            {
                if usable(format, stat) {
                    return Some(format.clone());
                }
            }
        }

        ranking
            .iter()
            .find(|(format, stat)| usable(format, stat))
            .map(|(format, _)| format.clone())
    }

    /// Finds an instructor and commits one class into the cell.
    fn place_class(
        &self,
        run: &mut Run<'_>,
        location: &str,
        day: DayOfWeek,
        time: TimeOfDay,
        format: &str,
    ) -> bool {
        let duration = self.rules.class_duration(format);
        let Some(instructor) = self.pick_instructor(run, location, day, time, format, duration)
        else {
            log::debug!("no instructor available for {format} at {location} {day} {time}");
            return false;
        };

        let display_name = run
            .roster
            .iter()
            .find(|i| i.id == instructor)
            .map(|i| i.display_name())
            .unwrap_or_else(|| instructor.as_str().to_string());

        let stat = run
            .cell_formats
            .get(&(location.to_string(), day, time))
            .and_then(|ranking| ranking.iter().find(|(f, _)| f == format))
            .map(|(_, stat)| stat.clone());

        let mut assignment = ClassAssignment::new(
            next_id(run),
            day,
            time,
            location,
            format,
            instructor.clone(),
            display_name,
        )
        .with_duration(duration);
        if let Some(stat) = stat {
            if stat.avg_participants() >= self.rules.config().top_performer_min_average {
                assignment = assignment.top_performer();
            }
            assignment = assignment
                .with_expected_participants(stat.rounded_avg_participants())
                .with_expected_revenue(stat.rounded_avg_revenue());
        }

        run.tracker
            .commit(&instructor, day, time, location, duration);
        run.schedule.add_assignment(assignment);
        true
    }

    /// Best historic instructor for the exact cell, falling back to any
    /// eligible rostered instructor (senior tier preferred at peak times).
    fn pick_instructor(
        &self,
        run: &Run<'_>,
        location: &str,
        day: DayOfWeek,
        time: TimeOfDay,
        format: &str,
        duration: f64,
    ) -> Option<InstructorId> {
        let available = |id: &InstructorId| {
            !run.schedule.instructor_busy_at(id, day, time)
                && run
                    .tracker
                    .can_assign(id, day, location, duration, format)
                    .is_ok()
        };

        if let Some(ranking) = run.cell_instructors.get(&(
            format.to_string(),
            location.to_string(),
            day,
            time,
        )) {
            for (id, _) in ranking {
                if run.roster.iter().any(|i| &i.id == id) && available(id) {
                    return Some(id.clone());
                }
            }
        }

        // Fallback: roster scan. Senior tier leads at peak times; then
        // lightest current load for balance, then name for determinism.
        let peak = self.rules.is_peak(time);
        let mut candidates: Vec<&Instructor> = run.roster.iter().collect();
        candidates.sort_by(|a, b| {
            let senior_rank =
                |i: &Instructor| if peak && i.tier == InstructorTier::Senior { 0 } else { 1 };
            senior_rank(a)
                .cmp(&senior_rank(b))
                .then(
                    run.tracker
                        .weekly_hours(&a.id)
                        .partial_cmp(&run.tracker.weekly_hours(&b.id))
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
                .then(a.id.cmp(&b.id))
        });
        candidates
            .into_iter()
            .find(|i| available(&i.id))
            .map(|i| i.id.clone())
    }

    // ---------------- Phase 2: instructor utilization ----------------

    fn maximize_utilization(&self, run: &mut Run<'_>) {
        let slots = self.rules.available_slots();
        let locations = run.locations.clone();
        let days = run.days.clone();
        let roster: Vec<(InstructorId, f64)> = run
            .roster
            .iter()
            .map(|i| (i.id.clone(), self.rules.config().weekly_cap_for(i.tier)))
            .collect();
        let mut placed = 0usize;

        for (instructor, target) in roster {
            let specialties: Vec<String> = run
                .instructor_formats
                .get(&instructor)
                .map(|ranked| ranked.iter().take(3).map(|(f, _)| f.clone()).collect())
                .unwrap_or_else(|| {
                    run.roster
                        .iter()
                        .find(|i| i.id == instructor)
                        .map(|i| i.specialties.iter().take(3).cloned().collect())
                        .unwrap_or_default()
                });

            'specialties: for format in &specialties {
                if run.tracker.weekly_hours(&instructor) >= target {
                    break;
                }
                let duration = self.rules.class_duration(format);
                for location in &locations {
                    for &day in &days {
                        let guidelines = self.rules.day_guidelines(day);
                        if guidelines
                            .avoid_formats
                            .iter()
                            .any(|f| f.eq_ignore_ascii_case(format))
                        {
                            continue;
                        }
                        for &time in &slots {
                            if run.tracker.weekly_hours(&instructor) >= target {
                                break 'specialties;
                            }
                            if !self.cell_open(run, location, day, time, format, &guidelines) {
                                continue;
                            }
                            if run.schedule.instructor_busy_at(&instructor, day, time)
                                || run
                                    .tracker
                                    .can_assign(&instructor, day, location, duration, format)
                                    .is_err()
                            {
                                continue;
                            }
                            self.commit_extra(run, &instructor, location, day, time, format);
                            placed += 1;
                        }
                    }
                }
            }
        }
        log::debug!("phase 2: {placed} utilization class(es) added");
    }

    fn cell_open(
        &self,
        run: &Run<'_>,
        location: &str,
        day: DayOfWeek,
        time: TimeOfDay,
        format: &str,
        guidelines: &crate::config::DayGuidelines,
    ) -> bool {
        run.schedule.count_for_day(day, location) < guidelines.max_classes
            && run.schedule.assignments_in_cell(day, time, location).len()
                < self.rules.parallel_capacity(location)
            && !run.schedule.format_in_cell(day, time, location, format)
            && self.rules.format_allowed_at(format, location)
            && !self.rules.is_excluded_format(format)
    }

    fn commit_extra(
        &self,
        run: &mut Run<'_>,
        instructor: &InstructorId,
        location: &str,
        day: DayOfWeek,
        time: TimeOfDay,
        format: &str,
    ) {
        let duration = self.rules.class_duration(format);
        let display_name = run
            .roster
            .iter()
            .find(|i| &i.id == instructor)
            .map(|i| i.display_name())
            .unwrap_or_else(|| instructor.as_str().to_string());
        let assignment = ClassAssignment::new(
            next_id(run),
            day,
            time,
            location,
            format,
            instructor.clone(),
            display_name,
        )
        .with_duration(duration);
        run.tracker
            .commit(instructor, day, time, location, duration);
        run.schedule.add_assignment(assignment);
    }

    // ---------------- Phase 3: core format diversity ----------------

    fn enforce_diversity(&self, run: &mut Run<'_>) {
        let core_formats = self.rules.config().core_formats.clone();
        let floor = self.rules.config().core_format_min_weekly;
        let slots = self.rules.available_slots();
        let locations = run.locations.clone();
        let days = run.days.clone();

        for format in &core_formats {
            'fill: while run.schedule.format_week_count(format) < floor {
                let duration = self.rules.class_duration(format);
                for location in &locations {
                    for &day in &days {
                        let guidelines = self.rules.day_guidelines(day);
                        if guidelines
                            .avoid_formats
                            .iter()
                            .any(|f| f.eq_ignore_ascii_case(format))
                        {
                            continue;
                        }
                        for &time in &slots {
                            if !self.cell_open(run, location, day, time, format, &guidelines) {
                                continue;
                            }
                            // Globally strongest instructor for the format
                            // first, then the usual cell-based pick.
                            let instructor = run
                                .format_instructors
                                .get(format.as_str())
                                .and_then(|ranking| {
                                    ranking
                                        .iter()
                                        .map(|(id, _)| id)
                                        .find(|id| {
                                            run.roster.iter().any(|i| &i.id == *id)
                                                && !run
                                                    .schedule
                                                    .instructor_busy_at(id, day, time)
                                                && run
                                                    .tracker
                                                    .can_assign(
                                                        id, day, location, duration, format,
                                                    )
                                                    .is_ok()
                                        })
                                        .cloned()
                                })
                                .or_else(|| {
                                    self.pick_instructor(
                                        run, location, day, time, format, duration,
                                    )
                                });
                            if let Some(instructor) = instructor {
                                self.commit_extra(run, &instructor, location, day, time, format);
                                continue 'fill;
                            }
                        }
                    }
                }
                // No open eligible cell anywhere: accept the shortfall.
                log::info!(
                    "diversity floor unmet for {format}: {} of {floor} placed",
                    run.schedule.format_week_count(format)
                );
                break;
            }
        }
    }

    // ---------------- Phase 4: shift consolidation ----------------

    /// Reduces the number of distinct instructors per (location, day,
    /// shift) to at most two where possible. The plan is computed from a
    /// snapshot first, then each move is re-validated at commit time and
    /// skipped individually on rejection.
    fn consolidate_shifts(&self, run: &mut Run<'_>) {
        let mut plan: Vec<ReassignMove> = Vec::new();
        let locations = run.locations.clone();
        let days = run.days.clone();

        for location in &locations {
            for &day in &days {
                for shift in Shift::ALL {
                    let in_shift: Vec<&ClassAssignment> = run
                        .schedule
                        .assignments
                        .iter()
                        .filter(|a| {
                            a.location == *location && a.day == day && a.shift() == shift
                        })
                        .collect();

                    let mut per_instructor: HashMap<&InstructorId, usize> = HashMap::new();
                    for a in &in_shift {
                        *per_instructor.entry(&a.instructor).or_insert(0) += 1;
                    }
                    if per_instructor.len() <= 2 {
                        continue;
                    }

                    // Keep the two busiest; everyone else donates.
                    let mut ordered: Vec<(&InstructorId, usize)> =
                        per_instructor.into_iter().collect();
                    ordered.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
                    let keepers: Vec<InstructorId> =
                        ordered.iter().take(2).map(|(id, _)| (*id).clone()).collect();

                    for a in in_shift
                        .iter()
                        .filter(|a| !a.is_locked && !keepers.contains(&a.instructor))
                    {
                        // Prefer the busier keeper as the target.
                        for keeper in &keepers {
                            plan.push(ReassignMove {
                                assignment_id: a.id.clone(),
                                to: keeper.clone(),
                            });
                        }
                    }
                }
            }
        }

        let mut applied = 0usize;
        let mut reassigned: HashSet<String> = HashSet::new();
        for step in plan {
            if reassigned.contains(&step.assignment_id) {
                continue;
            }
            if self.apply_reassignment(run, &step) {
                reassigned.insert(step.assignment_id);
                applied += 1;
            }
        }
        log::debug!("phase 4: {applied} reassignment(s) applied");
    }

    /// Applies one planned reassignment, rolling back on rejection.
    fn apply_reassignment(&self, run: &mut Run<'_>, step: &ReassignMove) -> bool {
        let Some(assignment) = run
            .schedule
            .assignments
            .iter()
            .find(|a| a.id == step.assignment_id)
            .cloned()
        else {
            return false;
        };
        if assignment.instructor == step.to
            || run
                .schedule
                .instructor_busy_at(&step.to, assignment.day, assignment.time)
        {
            return false;
        }

        let from = assignment.instructor.clone();
        run.tracker.release(
            &from,
            assignment.day,
            assignment.time,
            assignment.duration_hours,
        );
        match run.tracker.can_assign(
            &step.to,
            assignment.day,
            &assignment.location,
            assignment.duration_hours,
            &assignment.class_format,
        ) {
            Ok(()) => {
                run.tracker.commit(
                    &step.to,
                    assignment.day,
                    assignment.time,
                    &assignment.location,
                    assignment.duration_hours,
                );
                let display_name = run
                    .roster
                    .iter()
                    .find(|i| i.id == step.to)
                    .map(|i| i.display_name())
                    .unwrap_or_else(|| step.to.as_str().to_string());
                if let Some(a) = run
                    .schedule
                    .assignments
                    .iter_mut()
                    .find(|a| a.id == step.assignment_id)
                {
                    a.instructor = step.to.clone();
                    a.instructor_name = display_name;
                }
                true
            }
            Err(rejection) => {
                // Restore the original accounting and skip only this move.
                run.tracker.commit(
                    &from,
                    assignment.day,
                    assignment.time,
                    &assignment.location,
                    assignment.duration_hours,
                );
                log::debug!("reassignment of {} skipped: {rejection}", assignment.id);
                false
            }
        }
    }

    // ---------------- Phase 5: morning/evening balance ----------------

    /// Moves classes from an overloaded shift into empty slots of the
    /// other shift until counts differ by at most two. Only the time
    /// changes; hour accounting is untouched (shift occupancy is a
    /// best-effort heuristic at this point, not re-validated).
    fn balance_shifts(&self, run: &mut Run<'_>) {
        let slots = self.rules.available_slots();
        let locations = run.locations.clone();
        let days = run.days.clone();
        let mut applied = 0usize;

        for location in &locations {
            for &day in &days {
                let mut plan: Vec<TimeMove> = Vec::new();
                let morning: Vec<&ClassAssignment> = run
                    .schedule
                    .assignments
                    .iter()
                    .filter(|a| {
                        a.location == *location && a.day == day && a.shift() == Shift::Morning
                    })
                    .collect();
                let evening: Vec<&ClassAssignment> = run
                    .schedule
                    .assignments
                    .iter()
                    .filter(|a| {
                        a.location == *location && a.day == day && a.shift() == Shift::Evening
                    })
                    .collect();

                let (from, to_shift) = if morning.len() > evening.len() + 2 {
                    (&morning, Shift::Evening)
                } else if evening.len() > morning.len() + 2 {
                    (&evening, Shift::Morning)
                } else {
                    continue;
                };
                let excess = (morning.len() as i64 - evening.len() as i64).unsigned_abs() as usize;
                let moves_needed = (excess - 2).div_ceil(2);

                let mut movable: Vec<&&ClassAssignment> =
                    from.iter().filter(|a| !a.is_locked).collect();
                movable.sort_by(|a, b| a.time.cmp(&b.time).then(a.id.cmp(&b.id)));

                let mut claimed: HashSet<TimeOfDay> = HashSet::new();
                for a in movable.into_iter().take(moves_needed) {
                    let target = slots.iter().copied().find(|t| {
                        t.shift() == to_shift
                            && !claimed.contains(t)
                            && run.schedule.assignments_in_cell(day, *t, location).is_empty()
                            && !run.schedule.instructor_busy_at(&a.instructor, day, *t)
                    });
                    if let Some(new_time) = target {
                        claimed.insert(new_time);
                        plan.push(TimeMove {
                            assignment_id: a.id.clone(),
                            new_time,
                        });
                    }
                }

                for step in plan {
                    // Re-check the destination is still empty at commit time.
                    let Some(a) = run
                        .schedule
                        .assignments
                        .iter()
                        .find(|a| a.id == step.assignment_id)
                        .cloned()
                    else {
                        continue;
                    };
                    if !run
                        .schedule
                        .assignments_in_cell(day, step.new_time, location)
                        .is_empty()
                        || run
                            .schedule
                            .instructor_busy_at(&a.instructor, day, step.new_time)
                    {
                        continue;
                    }
                    if let Some(a) = run
                        .schedule
                        .assignments
                        .iter_mut()
                        .find(|a| a.id == step.assignment_id)
                    {
                        a.time = step.new_time;
                        applied += 1;
                    }
                }
            }
        }
        log::debug!("phase 5: {applied} balance move(s) applied");
    }

    // ---------------- Final audit ----------------

    /// Records warnings for empty cells and post-hoc invariant breaches.
    fn audit(&self, run: &mut Run<'_>) {
        let slots = self.rules.available_slots();
        let locations = run.locations.clone();
        let days = run.days.clone();

        for location in &locations {
            for &day in &days {
                for &time in &slots {
                    if run.schedule.assignments_in_cell(day, time, location).is_empty() {
                        log::debug!("empty cell: {location} {day} {time}");
                        run.schedule.add_warning(ScheduleWarning::new(
                            WarningKind::EmptyCell,
                            format!("No class scheduled at {location} on {day} {time}"),
                        ));
                    } else {
                        let count =
                            run.schedule.assignments_in_cell(day, time, location).len();
                        let capacity = self.rules.parallel_capacity(location);
                        if count > capacity {
                            run.schedule.add_warning(ScheduleWarning::new(
                                WarningKind::CapacityExceeded,
                                format!(
                                    "{count} parallel classes at {location} on {day} {time} \
                                     (capacity {capacity})"
                                ),
                            ));
                        }
                    }
                }
            }
        }

        let hour_warnings =
            super::manual::audit_instructor_hours(&run.schedule, run.roster, &self.rules);
        for warning in hour_warnings {
            log::warn!("{}", warning.message);
            run.schedule.add_warning(warning);
        }
    }
}

/// Objective score for a stat under a goal.
fn score(stat: &PerformanceStat, goal: OptimizationGoal) -> f64 {
    match goal {
        OptimizationGoal::Attendance => stat.avg_participants(),
        OptimizationGoal::Revenue => stat.avg_revenue(),
        // Revenue in rupees dwarfs headcounts; scale it down so both
        // signals contribute.
        OptimizationGoal::Balanced => stat.avg_participants() + stat.avg_revenue() / 1_000.0,
    }
}

/// Sorts a ranking by goal score descending, frequency descending, then a
/// caller-provided key for determinism.
fn sort_by_score<T, F>(ranking: &mut [(T, PerformanceStat)], goal: OptimizationGoal, key: F)
where
    F: Fn(&(T, PerformanceStat)) -> String,
{
    ranking.sort_by(|a, b| {
        score(&b.1, goal)
            .partial_cmp(&score(&a.1, goal))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(b.1.count.cmp(&a.1.count))
            .then(key(a).cmp(&key(b)))
    });
}

fn merge_stat(into: &mut PerformanceStat, from: &PerformanceStat) {
    into.participants_sum += from.participants_sum;
    into.revenue_sum += from.revenue_sum;
    into.count += from.count;
}

fn next_id(run: &mut Run<'_>) -> String {
    let id = format!("A-{:03}", run.next_id);
    run.next_id += 1;
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LockedSeed;
    use proptest::prelude::*;

    fn record(
        format: &str,
        location: &str,
        day: DayOfWeek,
        time: TimeOfDay,
        instructor: &str,
        participants: u32,
    ) -> HistoricClassRecord {
        HistoricClassRecord::new(format, location, day, time, instructor)
            .with_participants(participants)
            .with_revenue(participants as f64 * 700.0)
    }

    fn sample_roster() -> Vec<Instructor> {
        vec![
            Instructor::new("Anita", "Rao").with_tier(InstructorTier::Senior),
            Instructor::new("Vikram", "Shetty").with_tier(InstructorTier::Senior),
            Instructor::new("Priya", "Nair"),
            Instructor::new("Rohan", "Mehta"),
            Instructor::new("Meera", "Iyer"),
            Instructor::new("Tara", "Bose").with_tier(InstructorTier::New),
        ]
    }

    /// A week of plausible history across the three studios.
    fn sample_records() -> Vec<HistoricClassRecord> {
        let mut records = Vec::new();
        let cells = [
            ("Studio Barre 57", "Kwality House", DayOfWeek::Monday, (9, 0), "Anita Rao", 22),
            ("Studio Mat 57", "Kwality House", DayOfWeek::Monday, (10, 0), "Priya Nair", 18),
            ("Studio FIT", "Kwality House", DayOfWeek::Monday, (18, 0), "Rohan Mehta", 15),
            ("Studio Barre 57", "Kwality House", DayOfWeek::Tuesday, (9, 0), "Anita Rao", 20),
            ("Studio Mat 57", "Kwality House", DayOfWeek::Tuesday, (10, 0), "Priya Nair", 17),
            ("Studio HIIT", "Kwality House", DayOfWeek::Thursday, (19, 0), "Vikram Shetty", 24),
            ("Studio powerCycle", "Supreme HQ, Bandra", DayOfWeek::Monday, (18, 0), "Vikram Shetty", 28),
            ("Studio powerCycle", "Supreme HQ, Bandra", DayOfWeek::Friday, (9, 0), "Meera Iyer", 26),
            ("Studio Barre 57", "Supreme HQ, Bandra", DayOfWeek::Wednesday, (9, 0), "Anita Rao", 19),
            ("Studio FIT", "Kenkere House", DayOfWeek::Wednesday, (18, 30), "Rohan Mehta", 16),
            ("Studio Cardio Barre", "Kenkere House", DayOfWeek::Saturday, (11, 0), "Rohan Mehta", 14),
            ("Studio Mat 57", "Kenkere House", DayOfWeek::Thursday, (10, 0), "Tara Bose", 12),
            ("Studio Recovery", "Kwality House", DayOfWeek::Sunday, (10, 0), "Meera Iyer", 10),
        ];
        for (format, location, day, (h, m), instructor, participants) in cells {
            for i in 0..3 {
                records.push(record(
                    format,
                    location,
                    day,
                    TimeOfDay::new(h, m),
                    instructor,
                    participants + i,
                ));
            }
        }
        records
    }

    fn generate() -> WeeklySchedule {
        let optimizer = ScheduleOptimizer::new(ScheduleConfig::default());
        optimizer.generate(&sample_records(), &sample_roster(), &OptimizerOptions::new())
    }

    #[test]
    fn test_locked_seeds_present_and_locked() {
        let schedule = generate();
        // The Saturday 10:15 Mat 57 seed survives every later phase.
        let cell = schedule.assignments_in_cell(
            DayOfWeek::Saturday,
            TimeOfDay::new(10, 15),
            "Kwality House",
        );
        let seed = cell
            .iter()
            .find(|a| a.class_format == "Studio Mat 57")
            .expect("seed class missing");
        assert!(seed.is_locked);
        assert!(seed.is_top_performer);
        assert_eq!(seed.instructor, InstructorId::from_name("Priya Nair"));
    }

    #[test]
    fn test_no_assignment_in_restricted_band() {
        let schedule = generate();
        let rules = Rules::new(ScheduleConfig::default());
        for a in &schedule.assignments {
            assert!(
                !rules.is_restricted_time(a.time, a.is_private),
                "{} scheduled at {}",
                a.class_format,
                a.time
            );
        }
    }

    #[test]
    fn test_format_location_rules_hold() {
        let schedule = generate();
        let rules = Rules::new(ScheduleConfig::default());
        for a in &schedule.assignments {
            assert!(
                rules.format_allowed_at(&a.class_format, &a.location),
                "{} placed at {}",
                a.class_format,
                a.location
            );
        }
    }

    #[test]
    fn test_cell_capacity_and_format_uniqueness() {
        let schedule = generate();
        let rules = Rules::new(ScheduleConfig::default());
        let mut seen: HashSet<(DayOfWeek, TimeOfDay, String, String)> = HashSet::new();
        let mut cells: HashMap<(DayOfWeek, TimeOfDay, String), usize> = HashMap::new();
        for a in &schedule.assignments {
            assert!(
                seen.insert((a.day, a.time, a.location.clone(), a.class_format.clone())),
                "duplicate {} at {} {} {}",
                a.class_format,
                a.location,
                a.day,
                a.time
            );
            *cells
                .entry((a.day, a.time, a.location.clone()))
                .or_insert(0) += 1;
        }
        for ((_, _, location), count) in cells {
            assert!(count <= rules.parallel_capacity(&location));
        }
    }

    #[test]
    fn test_no_instructor_double_booking() {
        let schedule = generate();
        let mut seen: HashSet<(InstructorId, DayOfWeek, TimeOfDay)> = HashSet::new();
        for a in &schedule.assignments {
            assert!(
                seen.insert((a.instructor.clone(), a.day, a.time)),
                "{} double-booked at {} {}",
                a.instructor,
                a.day,
                a.time
            );
        }
    }

    #[test]
    fn test_one_location_per_instructor_day() {
        let schedule = generate();
        let mut day_location: HashMap<(InstructorId, DayOfWeek), String> = HashMap::new();
        for a in &schedule.assignments {
            let existing = day_location
                .entry((a.instructor.clone(), a.day))
                .or_insert_with(|| a.location.clone());
            assert_eq!(*existing, a.location, "{} split across locations", a.instructor);
        }
    }

    #[test]
    fn test_sunday_day_cap() {
        let schedule = generate();
        let config = ScheduleConfig::default();
        let cap = config.guidelines(DayOfWeek::Sunday).max_classes;
        let mut per_location: HashMap<&str, usize> = HashMap::new();
        for a in schedule.assignments.iter().filter(|a| a.day == DayOfWeek::Sunday) {
            *per_location.entry(a.location.as_str()).or_insert(0) += 1;
        }
        for (location, count) in per_location {
            assert!(count <= cap, "{location} has {count} Sunday classes");
        }
    }

    #[test]
    fn test_target_day_limits_output() {
        let optimizer = ScheduleOptimizer::new(ScheduleConfig::default());
        let options = OptimizerOptions::new().with_target_day(DayOfWeek::Monday);
        let schedule = optimizer.generate(&sample_records(), &sample_roster(), &options);
        assert!(!schedule.assignments.is_empty());
        assert!(schedule.assignments.iter().all(|a| a.day == DayOfWeek::Monday));
    }

    #[test]
    fn test_empty_records_still_seed() {
        // With no history, phase 1 has nothing to rank, but the curated
        // seeds still land.
        let optimizer = ScheduleOptimizer::new(ScheduleConfig::default());
        let schedule =
            optimizer.generate(&[], &sample_roster(), &OptimizerOptions::new());
        let locked = schedule.assignments.iter().filter(|a| a.is_locked).count();
        assert_eq!(locked, 10);
        // Anything beyond the seeds can only come from the core-format
        // diversity floor.
        let config = ScheduleConfig::default();
        for a in schedule.assignments.iter().filter(|a| !a.is_locked) {
            assert!(config.core_formats.contains(&a.class_format));
        }
        assert!(schedule
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::EmptyCell));
    }

    #[test]
    fn test_deterministic_output() {
        let a = generate();
        let b = generate();
        assert_eq!(a.assignment_count(), b.assignment_count());
        for (x, y) in a.assignments.iter().zip(&b.assignments) {
            assert_eq!(x.id, y.id);
            assert_eq!(x.class_format, y.class_format);
            assert_eq!(x.instructor, y.instructor);
            assert_eq!((x.day, x.time, x.location.clone()), (y.day, y.time, y.location.clone()));
        }
    }

    #[test]
    fn test_goal_changes_ranking_not_validity() {
        let optimizer = ScheduleOptimizer::new(ScheduleConfig::default());
        for goal in [
            OptimizationGoal::Balanced,
            OptimizationGoal::Revenue,
            OptimizationGoal::Attendance,
        ] {
            let options = OptimizerOptions::new().with_goal(goal);
            let schedule = optimizer.generate(&sample_records(), &sample_roster(), &options);
            let rules = Rules::new(ScheduleConfig::default());
            for a in &schedule.assignments {
                assert!(rules.format_allowed_at(&a.class_format, &a.location));
            }
        }
    }

    #[test]
    fn test_infeasible_seed_is_skipped() {
        // A seed whose instructor is unavailable that day cannot land.
        let mut config = ScheduleConfig::default();
        config.locked_seeds = vec![LockedSeed::new(
            "Studio Barre 57",
            DayOfWeek::Friday,
            TimeOfDay::new(9, 0),
            "Kwality House",
            "Meera Iyer",
        )];
        let roster = vec![Instructor::new("Meera", "Iyer")
            .with_available_days(vec![DayOfWeek::Monday])];
        let optimizer = ScheduleOptimizer::new(config);
        let schedule = optimizer.generate(&[], &roster, &OptimizerOptions::new());
        assert!(schedule.assignments.iter().all(|a| !a.is_locked));
        // Everything that did land respects the single available day.
        assert!(schedule
            .assignments
            .iter()
            .all(|a| a.day == DayOfWeek::Monday));
    }

    // Strategy: random but plausible history over the known grid.
    fn arb_records() -> impl Strategy<Value = Vec<HistoricClassRecord>> {
        let formats = prop::sample::select(vec![
            "Studio Barre 57",
            "Studio Mat 57",
            "Studio FIT",
            "Studio HIIT",
            "Studio powerCycle",
            "Studio Recovery",
        ]);
        let locations = prop::sample::select(vec![
            "Kwality House",
            "Supreme HQ, Bandra",
            "Kenkere House",
        ]);
        let instructors = prop::sample::select(vec![
            "Anita Rao",
            "Vikram Shetty",
            "Priya Nair",
            "Rohan Mehta",
            "Meera Iyer",
            "Tara Bose",
        ]);
        let days = prop::sample::select(DayOfWeek::ALL.to_vec());
        let slot = prop::sample::select(
            Rules::new(ScheduleConfig::default()).available_slots(),
        );
        prop::collection::vec(
            (formats, locations, days, slot, instructors, 1u32..40),
            0..120,
        )
        .prop_map(|rows| {
            rows.into_iter()
                .map(|(format, location, day, time, instructor, participants)| {
                    record(format, location, day, time, instructor, participants)
                })
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_caps_hold_for_arbitrary_history(records in arb_records()) {
            let optimizer = ScheduleOptimizer::new(ScheduleConfig::default());
            let schedule =
                optimizer.generate(&records, &sample_roster(), &OptimizerOptions::new());
            let config = ScheduleConfig::default();

            let roster = sample_roster();
            for (id, hours) in schedule.instructor_hours() {
                let tier = roster
                    .iter()
                    .find(|i| i.id == id)
                    .map(|i| i.tier)
                    .unwrap_or_default();
                prop_assert!(hours <= config.weekly_cap_for(tier) + 1e-9);
                for day in DayOfWeek::ALL {
                    prop_assert!(
                        schedule.instructor_hours_on(&id, day) <= config.daily_cap_hours + 1e-9
                    );
                }
                prop_assert!(schedule.instructor_days(&id).len() <= 7 - config.min_days_off);
            }
        }

        #[test]
        fn prop_cell_capacity_holds(records in arb_records()) {
            let optimizer = ScheduleOptimizer::new(ScheduleConfig::default());
            let schedule =
                optimizer.generate(&records, &sample_roster(), &OptimizerOptions::new());
            let rules = Rules::new(ScheduleConfig::default());

            let mut cells: HashMap<(DayOfWeek, TimeOfDay, String), usize> = HashMap::new();
            for a in &schedule.assignments {
                *cells
                    .entry((a.day, a.time, a.location.clone()))
                    .or_insert(0) += 1;
            }
            for ((_, _, location), count) in cells {
                prop_assert!(count <= rules.parallel_capacity(&location));
            }
        }
    }
}
