use std::fs;

use pettingzoo_engine::{Game, Simulation as _};
use pettingzoo_genome::Artifact;
use pettingzoo_training::{
    Agent, AgentRunner, RunOptions, RunParams, Trainer,
    report::{BEST_FILE, HEADER_FILE, PARAMS_FILE, RUN_LOG_FILE},
};

fn params(gen_size: usize, generations: usize) -> RunParams {
    RunParams {
        in_h: 6,
        in_w: 6,
        hlc: 2,
        npl: 12,
        gen_size,
        generations,
        seed: 1234,
        ..RunParams::default()
    }
}

fn parse_log_line(line: &str) -> (usize, usize, usize, f32, f32, f32) {
    let fields: Vec<&str> = line.split(", ").collect();
    assert_eq!(fields.len(), 6, "{line}");
    for f in &fields[3..] {
        let decimals = f.split_once('.').map_or(0, |(_, d)| d.len());
        assert_eq!(decimals, 6, "{line}");
    }
    (
        fields[0].parse().unwrap(),
        fields[1].parse().unwrap(),
        fields[2].parse().unwrap(),
        fields[3].parse().unwrap(),
        fields[4].parse().unwrap(),
        fields[5].parse().unwrap(),
    )
}

#[test]
fn single_generation_writes_one_consistent_log_line() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("run");
    let options = RunOptions {
        output_dir: Some(out.clone()),
        quiet: true,
        ..RunOptions::default()
    };
    let params = params(4, 1);
    let report = Trainer::new(params.clone(), options).unwrap().run();
    assert_eq!(report.output_dir.as_deref(), Some(out.as_path()));

    let header = fs::read_to_string(out.join(HEADER_FILE)).unwrap();
    assert_eq!(header.trim_end(), "6, 6, 2, 12, 4, 1, 0.001000, 1234");
    assert!(out.join(PARAMS_FILE).is_file());

    let log = fs::read_to_string(out.join(RUN_LOG_FILE)).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 1);
    let (completed, timed_out, died, mean, max, min) = parse_log_line(lines[0]);
    assert_eq!(completed + timed_out + died, 4);
    assert!(min <= mean && mean <= max, "{min} {mean} {max}");

    let winners: Vec<_> = fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .filter(|name| name.starts_with("gen_0000_"))
        .collect();
    assert_eq!(winners.len(), 1, "{winners:?}");
    assert!(out.join(BEST_FILE).is_file());
}

#[test]
fn persisted_champion_replays_to_the_same_fitness() {
    let tmp = tempfile::tempdir().unwrap();
    let options = RunOptions {
        output_dir: Some(tmp.path().to_owned()),
        quiet: true,
        ..RunOptions::default()
    };
    let report = Trainer::new(params(6, 2), options).unwrap().run();

    let artifact = Artifact::load(&tmp.path().join(BEST_FILE)).unwrap();
    assert_eq!(artifact.seed, report.champion.seed);
    assert_eq!(&artifact.chromosome, report.champion.agent.chromosome());

    let agent = Agent::from_chromosome(artifact.chromosome);
    let mut game = Game::new(artifact.seed);
    let evaluation = AgentRunner::new(agent.chromosome().topology()).run(&agent, &mut game);
    assert_eq!(evaluation.fitness, report.champion.agent.fitness());
    assert_eq!(evaluation.fitness, game.fitness());
}

#[test]
fn unwritable_output_directory_does_not_stop_training() {
    let tmp = tempfile::tempdir().unwrap();
    let blocker = tmp.path().join("file");
    fs::write(&blocker, b"not a directory").unwrap();
    let options = RunOptions {
        output_dir: Some(blocker.join("run")),
        quiet: true,
        ..RunOptions::default()
    };
    let report = Trainer::new(params(4, 2), options).unwrap().run();
    assert_eq!(report.summaries.len(), 2);
    assert!(report.output_dir.is_none());
}

#[test]
fn failed_log_write_mid_run_keeps_training_and_saving_champions() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("run");
    let options = RunOptions {
        output_dir: Some(out.clone()),
        quiet: true,
        ..RunOptions::default()
    };
    let mut trainer = Trainer::new(params(4, 3), options).unwrap();
    trainer.step();

    let log = out.join(RUN_LOG_FILE);
    fs::remove_file(&log).unwrap();
    fs::create_dir(&log).unwrap();

    let report = trainer.run();
    assert_eq!(report.summaries.len(), 2);
    assert_eq!(report.output_dir.as_deref(), Some(out.as_path()));

    let names: Vec<String> = fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    for prefix in ["gen_0000_", "gen_0001_", "gen_0002_"] {
        assert!(names.iter().any(|n| n.starts_with(prefix)), "{prefix}: {names:?}");
    }
    assert!(out.join(BEST_FILE).is_file());
    assert!(log.is_dir());
}
