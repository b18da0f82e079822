use log::{debug, warn};
use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

/// 回收已经结束的后台进程，返回回收的个数。
///
/// 后台命令不进任务表，只在每次显示提示符前清理僵尸进程。
pub fn reap_background() -> usize {
    reap(Pid::from_raw(-1))
}

fn reap(target: Pid) -> usize {
    let mut reaped = 0;
    loop {
        match waitpid(target, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => break,
            Ok(WaitStatus::Exited(pid, code)) => {
                debug!("后台进程 {} 已退出: {}", pid, code);
                reaped += 1;
            }
            Ok(WaitStatus::Signaled(pid, signal, _)) => {
                debug!("后台进程 {} 被信号终止: {}", pid, signal);
                reaped += 1;
            }
            Ok(status) => debug!("忽略等待状态: {:?}", status),
            // 没有子进程可等
            Err(Errno::ECHILD) => break,
            Err(e) => {
                warn!("waitpid 失败: {}", e);
                break;
            }
        }
    }
    reaped
}
